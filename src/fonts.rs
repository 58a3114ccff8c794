use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::config::{FontRole, PT_TO_MM, TextStyle};
use crate::error::{Error, Result};

/// Helvetica advance widths (1000 units/em) for ASCII 32..=126, from the AFM.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

/// WinAnsi bytes 128..=255. Codes with no assigned character keep the AFM
/// default of 350; they are never produced by `char_to_winansi`.
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350, // 0x80
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

const HELVETICA_BOLD_HIGH_WIDTHS: [u16; 128] = [
    556, 350, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350, // 0x80
    350, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 350, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // 0xF0
];

enum FaceSource {
    Builtin {
        base_font: &'static str,
        widths: &'static [u16; 95],
        high_widths: &'static [u16; 128],
    },
    TrueType {
        data: Vec<u8>,
        face_index: u32,
        widths_1000: HashMap<char, f32>,
        missing_width: f32,
    },
}

/// A measurable font face: either one of the PDF base-14 Helvetica faces or a
/// TrueType/OpenType face loaded from disk.
pub struct FontFace {
    name: String,
    source: FaceSource,
    ascender_ratio: f32,
    descender_ratio: f32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.name)
            .field("builtin", &self.is_builtin())
            .finish()
    }
}

impl FontFace {
    pub fn helvetica() -> Self {
        Self {
            name: "Helvetica".to_string(),
            source: FaceSource::Builtin {
                base_font: "Helvetica",
                widths: &HELVETICA_WIDTHS,
                high_widths: &HELVETICA_HIGH_WIDTHS,
            },
            ascender_ratio: 0.718,
            descender_ratio: 0.207,
        }
    }

    pub fn helvetica_bold() -> Self {
        Self {
            name: "Helvetica-Bold".to_string(),
            source: FaceSource::Builtin {
                base_font: "Helvetica-Bold",
                widths: &HELVETICA_BOLD_WIDTHS,
                high_widths: &HELVETICA_BOLD_HIGH_WIDTHS,
            },
            ascender_ratio: 0.718,
            descender_ratio: 0.207,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| {
            Error::Measurement(format!("cannot read font {}: {e}", path.display()))
        })?;
        Self::from_bytes(data, 0)
    }

    pub fn from_bytes(data: Vec<u8>, face_index: u32) -> Result<Self> {
        let face = Face::parse(&data, face_index)
            .map_err(|e| Error::Measurement(format!("cannot parse font: {e}")))?;
        let units = face.units_per_em() as f32;
        let advance_1000 = |gid| {
            face.glyph_hor_advance(gid)
                .map(|adv| adv as f32 / units * 1000.0)
                .unwrap_or(0.0)
        };

        let mut widths_1000 = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|cp| {
                    if let Some(ch) = char::from_u32(cp)
                        && let Some(gid) = subtable.glyph_index(cp)
                    {
                        widths_1000.entry(ch).or_insert_with(|| advance_1000(gid));
                    }
                });
            }
        }
        if widths_1000.is_empty() {
            return Err(Error::Measurement(
                "font has no Unicode character map".into(),
            ));
        }
        let missing_width = advance_1000(ttf_parser::GlyphId(0));
        let name = font_family_name(&face).unwrap_or_else(|| "Embedded".to_string());
        let ascender_ratio = face.ascender() as f32 / units;
        let descender_ratio = -(face.descender() as f32) / units;

        Ok(Self {
            name,
            source: FaceSource::TrueType {
                data,
                face_index,
                widths_1000,
                missing_width,
            },
            ascender_ratio,
            descender_ratio,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.source, FaceSource::Builtin { .. })
    }

    /// Width of a single character in 1000-units. Characters the builtin
    /// WinAnsi encoding cannot represent are dropped when drawn, so they
    /// measure zero.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        match &self.source {
            FaceSource::Builtin {
                widths,
                high_widths,
                ..
            } => match char_to_winansi(ch) {
                b @ 32..=126 => widths[(b - 32) as usize] as f32,
                b @ 128..=255 => high_widths[(b - 128) as usize] as f32,
                _ => 0.0,
            },
            FaceSource::TrueType {
                widths_1000,
                missing_width,
                ..
            } => widths_1000.get(&ch).copied().unwrap_or(*missing_width),
        }
    }

    /// Rendered width of `text` at `size` points, in layout units.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let w: f32 = text.chars().map(|ch| self.char_width_1000(ch)).sum();
        w * size / 1000.0 * PT_TO_MM
    }

    pub fn space_width(&self, size: f32) -> f32 {
        self.text_width(" ", size)
    }

    pub fn ascent(&self, size: f32) -> f32 {
        self.ascender_ratio * size * PT_TO_MM
    }

    pub fn descent(&self, size: f32) -> f32 {
        self.descender_ratio * size * PT_TO_MM
    }

    /// Write this face into `pdf` under `font_ref`, limited to `used_chars`.
    pub(crate) fn embed(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        pdf_name: String,
        used_chars: &HashSet<char>,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<EmbeddedFont> {
        match &self.source {
            FaceSource::Builtin { base_font, .. } => {
                pdf.type1_font(font_ref)
                    .base_font(Name(base_font.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                Ok(EmbeddedFont {
                    pdf_name,
                    font_ref,
                    char_to_gid: None,
                })
            }
            FaceSource::TrueType {
                data, face_index, ..
            } => {
                let char_to_gid = embed_truetype(
                    pdf,
                    font_ref,
                    &self.name,
                    data,
                    *face_index,
                    used_chars,
                    alloc,
                )?;
                Ok(EmbeddedFont {
                    pdf_name,
                    font_ref,
                    char_to_gid: Some(char_to_gid),
                })
            }
        }
    }
}

/// Regular and bold faces used by one renderer.
#[derive(Debug)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
}

impl Default for FontSet {
    fn default() -> Self {
        Self::helvetica()
    }
}

impl FontSet {
    pub fn helvetica() -> Self {
        Self {
            regular: FontFace::helvetica(),
            bold: FontFace::helvetica_bold(),
        }
    }

    /// Load faces from files. Without a bold file, the regular face is reused.
    pub fn from_files(regular: &Path, bold: Option<&Path>) -> Result<Self> {
        let regular_face = FontFace::from_file(regular)?;
        let bold_face = match bold {
            Some(path) => FontFace::from_file(path)?,
            None => {
                log::warn!(
                    "No bold font given, using {} for bold text",
                    regular.display()
                );
                FontFace::from_file(regular)?
            }
        };
        Ok(Self {
            regular: regular_face,
            bold: bold_face,
        })
    }

    /// Resolve a family through the system font directories and `REPORT_PDF_FONTS`.
    pub fn from_family(family: &str) -> Result<Self> {
        let (regular_path, regular_index) = find_font_file(family, false).ok_or_else(|| {
            Error::Measurement(format!("font family not found: {family}"))
        })?;
        let regular = FontFace::from_bytes(std::fs::read(&regular_path)?, regular_index)?;
        let bold = match find_font_file(family, true) {
            Some((path, index)) if path != regular_path || index != regular_index => {
                FontFace::from_bytes(std::fs::read(&path)?, index)?
            }
            _ => {
                log::warn!("No bold variant of {family}, using regular for bold text");
                FontFace::from_bytes(std::fs::read(&regular_path)?, regular_index)?
            }
        };
        Ok(Self { regular, bold })
    }

    pub fn face(&self, role: FontRole) -> &FontFace {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => &self.bold,
        }
    }

    pub fn text_width(&self, text: &str, style: &TextStyle) -> f32 {
        self.face(style.font).text_width(text, style.size)
    }
}

/// A face written into a PDF, able to encode text for its content streams.
pub(crate) struct EmbeddedFont {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl EmbeddedFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => encode_as_gids(text, map),
            None => to_winansi_bytes(text),
        }
    }
}

/// (lowercase family name, bold) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("REPORT_PDF_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        dirs.extend(
            val.split(sep)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(PathBuf::from),
        );
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("ttf" | "otf" | "ttc")
    )
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files_scanned = 0u32;

    let mut stack = font_directories();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            // Read-only map; the file is only parsed for its name table here.
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            files_scanned += 1;
            let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
            for face_idx in 0..face_count {
                let Ok(face) = Face::parse(&data, face_idx) else {
                    continue;
                };
                if face.is_italic() {
                    continue;
                }
                if let Some(family) = font_family_name(&face) {
                    index
                        .entry((family.to_lowercase(), face.is_bold()))
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed -> {} entries",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_scanned,
        index.len(),
    );
    index
}

fn find_font_file(family: &str, bold: bool) -> Option<(PathBuf, u32)> {
    FONT_INDEX
        .get_or_init(scan_font_dirs)
        .get(&(family.to_lowercase(), bold))
        .cloned()
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Unmappable characters are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Encode UTF-8 text as big-endian 2-byte glyph IDs for CIDFont content streams.
pub(crate) fn encode_as_gids(text: &str, char_to_gid: &HashMap<char, u16>) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let gid = char_to_gid.get(&ch).copied().unwrap_or(0);
        out.extend_from_slice(&gid.to_be_bytes());
    }
    out
}

/// Embed a TrueType/OpenType face as a CIDFont (Type0 composite) with Identity-H
/// encoding, subsetted to `used_chars`. Returns the char -> new glyph id map.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    font_name: &str,
    font_data: &[u8],
    face_index: u32,
    used_chars: &HashSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Result<HashMap<char, u16>> {
    let face = Face::parse(font_data, face_index)
        .map_err(|e| Error::Serialization(format!("cannot re-parse {font_name}: {e}")))?;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let units = face.units_per_em() as f32;
    let scale = |v: f32| v / units * 1000.0;
    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        scale(bb.x_min as f32),
        scale(bb.y_min as f32),
        scale(bb.x_max as f32),
        scale(bb.y_max as f32),
    );
    let cap_height = face
        .capital_height()
        .map(|h| scale(h as f32))
        .unwrap_or(700.0);

    // Sorted so glyph ids are assigned identically on every run.
    let mut chars: Vec<char> = used_chars.iter().copied().collect();
    chars.sort_unstable();

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for ch in chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let w = face
                .glyph_hor_advance(gid)
                .map(|adv| scale(adv as f32))
                .unwrap_or(0.0);
            gid_widths.push((new_gid, w));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset_data = subsetter::subset(font_data, face_index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {font_name}: {e}; embedding full font");
        font_data.to_vec()
    });
    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Serialization(format!("font {font_name} too large to embed")))?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name: String = font_name.chars().filter(|c| !c.is_whitespace()).collect();

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(scale(face.ascender() as f32))
        .descent(scale(face.descender() as f32))
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    let mut pairs: Vec<(u16, char)> = char_to_gid.iter().map(|(&ch, &gid)| (gid, ch)).collect();
    pairs.sort_unstable();
    for (gid, ch) in pairs {
        cmap.pair(gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Ok(char_to_gid)
}
