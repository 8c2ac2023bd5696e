use std::fmt;
use std::str::FromStr;

use apimodel_types::{TypeParseContext, TypeStringConfig};

use crate::SignatureError;

const HEADER_PREFIX: &str = "// Signature format: ";
const OPTION_PREFIX: &str = "// - ";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
    V2,
    V3,
    V4,
    V5,
}

impl FormatVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatVersion::V2 => "2.0",
            FormatVersion::V3 => "3.0",
            FormatVersion::V4 => "4.0",
            FormatVersion::V5 => "5.0",
        }
    }
}

impl FromStr for FormatVersion {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2.0" => Ok(FormatVersion::V2),
            "3.0" => Ok(FormatVersion::V3),
            "4.0" => Ok(FormatVersion::V4),
            "5.0" => Ok(FormatVersion::V5),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version plus the rendering options it selects. Option lines in the header override the
/// version defaults; only overrides are written back out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileFormat {
    pub version: FormatVersion,
    pub kotlin_style_nulls: bool,
    pub include_type_use_annotations: bool,
    pub kotlin_name_type_order: bool,
    pub omit_common_packages: bool,
}

impl Default for FileFormat {
    fn default() -> Self {
        FileFormat::V2
    }
}

impl FileFormat {
    pub const V2: FileFormat = FileFormat::for_version(FormatVersion::V2);
    pub const V3: FileFormat = FileFormat::for_version(FormatVersion::V3);
    pub const V4: FileFormat = FileFormat::for_version(FormatVersion::V4);
    pub const V5: FileFormat = FileFormat::for_version(FormatVersion::V5);

    pub const fn for_version(version: FormatVersion) -> Self {
        let (kotlin_style_nulls, include_type_use_annotations, kotlin_name_type_order) =
            match version {
                FormatVersion::V2 => (false, false, false),
                FormatVersion::V3 => (true, false, false),
                FormatVersion::V4 => (true, true, false),
                FormatVersion::V5 => (true, true, true),
            };
        FileFormat {
            version,
            kotlin_style_nulls,
            include_type_use_annotations,
            kotlin_name_type_order,
            omit_common_packages: true,
        }
    }

    /// `"3.0"` -> [`FileFormat::V3`].
    pub fn from_version_str(version: &str) -> Option<FileFormat> {
        version.parse().ok().map(FileFormat::for_version)
    }

    pub fn with_kotlin_style_nulls(mut self, value: bool) -> Self {
        self.kotlin_style_nulls = value;
        self
    }

    pub fn with_include_type_use_annotations(mut self, value: bool) -> Self {
        self.include_type_use_annotations = value;
        self
    }

    pub fn with_kotlin_name_type_order(mut self, value: bool) -> Self {
        self.kotlin_name_type_order = value;
        self
    }

    pub fn with_omit_common_packages(mut self, value: bool) -> Self {
        self.omit_common_packages = value;
        self
    }

    fn options(&self) -> [(&'static str, bool); 4] {
        [
            ("kotlin-style-nulls", self.kotlin_style_nulls),
            ("include-type-use-annotations", self.include_type_use_annotations),
            ("kotlin-name-type-order", self.kotlin_name_type_order),
            ("omit-common-packages", self.omit_common_packages),
        ]
    }

    fn set_option(&mut self, key: &str, value: bool) -> bool {
        match key {
            "kotlin-style-nulls" => self.kotlin_style_nulls = value,
            "include-type-use-annotations" => self.include_type_use_annotations = value,
            "kotlin-name-type-order" => self.kotlin_name_type_order = value,
            "omit-common-packages" => self.omit_common_packages = value,
            _ => return false,
        }
        true
    }

    /// The header block, ending with a newline.
    pub fn header(&self) -> String {
        let mut out = format!("{HEADER_PREFIX}{}\n", self.version);
        let defaults = FileFormat::for_version(self.version).options();
        for ((key, value), (_, default)) in self.options().into_iter().zip(defaults) {
            if value != default {
                out.push_str(&format!(
                    "{OPTION_PREFIX}{key}={}\n",
                    if value { "yes" } else { "no" }
                ));
            }
        }
        out
    }

    pub fn type_string_config(&self) -> TypeStringConfig {
        TypeStringConfig::new()
            .with_annotations(self.include_type_use_annotations)
            .with_kotlin_style_nulls(self.kotlin_style_nulls)
            .with_omit_common_packages(self.omit_common_packages)
    }

    pub fn type_parse_context(&self) -> TypeParseContext {
        TypeParseContext::new(self.kotlin_style_nulls, self.omit_common_packages)
    }
}

/// Where the declarations start after the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) format: FileFormat,
    /// Byte offset of the first line after the header.
    pub(crate) body_offset: usize,
    /// 1-based line number of that line.
    pub(crate) body_line: u32,
}

/// Reads the `// Signature format: N.N` line and any `// - key=value` option lines after it.
/// Text without a header uses `default`.
pub(crate) fn read_header(text: &str, default: FileFormat) -> Result<Header, SignatureError> {
    let mut offset = 0;
    let mut line_no = 0u32;
    let mut format: Option<FileFormat> = None;

    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if format.is_none() {
            if trimmed.is_empty() {
                offset += line.len();
                line_no += 1;
                continue;
            }
            let Some(version) = trimmed.strip_prefix(HEADER_PREFIX.trim_end()) else {
                break;
            };
            line_no += 1;
            let parsed = FileFormat::from_version_str(version).ok_or_else(|| {
                SignatureError::InvalidFormat {
                    line: line_no,
                    message: format!("unsupported signature format `{}`", version.trim()),
                }
            })?;
            format = Some(parsed);
            offset += line.len();
            continue;
        }

        let Some(option) = trimmed.strip_prefix(OPTION_PREFIX.trim_end()) else {
            break;
        };
        line_no += 1;
        let invalid = || SignatureError::InvalidFormat {
            line: line_no,
            message: format!("invalid format option `{}`", option.trim()),
        };
        let (key, value) = option.trim().split_once('=').ok_or_else(invalid)?;
        let value = match value.trim() {
            "yes" | "true" => true,
            "no" | "false" => false,
            _ => return Err(invalid()),
        };
        if let Some(current) = format.as_mut() {
            if !current.set_option(key.trim(), value) {
                return Err(invalid());
            }
        }
        offset += line.len();
    }

    match format {
        Some(format) => Ok(Header {
            format,
            body_offset: offset,
            body_line: line_no + 1,
        }),
        None => Ok(Header {
            format: default,
            body_offset: 0,
            body_line: 1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn version_defaults() {
        assert!(!FileFormat::V2.kotlin_style_nulls);
        assert!(FileFormat::V3.kotlin_style_nulls);
        assert!(FileFormat::V4.include_type_use_annotations);
        assert!(FileFormat::V5.kotlin_name_type_order);
        assert!(FileFormat::V2.omit_common_packages);
    }

    #[test]
    fn header_writes_only_overrides() {
        assert_eq!(FileFormat::V3.header(), "// Signature format: 3.0\n");
        let format = FileFormat::V2.with_include_type_use_annotations(true);
        assert_eq!(
            format.header(),
            "// Signature format: 2.0\n// - include-type-use-annotations=yes\n"
        );
    }

    #[test]
    fn header_round_trips_through_the_reader() {
        let format = FileFormat::V4
            .with_kotlin_name_type_order(true)
            .with_kotlin_style_nulls(false);
        let text = format!("{}package a {{\n}}\n", format.header());
        let header = read_header(&text, FileFormat::V2).unwrap();
        assert_eq!(header.format, format);
        assert_eq!(header.body_line, 4);
        assert!(text[header.body_offset..].starts_with("package a"));
    }

    #[test]
    fn missing_header_uses_the_default() {
        let header = read_header("package a {\n}\n", FileFormat::V3).unwrap();
        assert_eq!(header.format, FileFormat::V3);
        assert_eq!(header.body_offset, 0);
    }

    #[test]
    fn bad_headers_are_format_errors() {
        let err = read_header("// Signature format: 9.9\n", FileFormat::V2).unwrap_err();
        assert_eq!(
            err,
            SignatureError::InvalidFormat {
                line: 1,
                message: "unsupported signature format `9.9`".into()
            }
        );
        let err =
            read_header("// Signature format: 2.0\n// - colour=yes\n", FileFormat::V2).unwrap_err();
        assert_eq!(err.line(), 2);
    }
}
