//! Manifest parsing from files and strings.

use std::{path::Path, str::FromStr};

use fgen_core::is_path_segment;
use toml::Spanned;

use super::{MANIFEST_FILE, Manifest};
use crate::{Error, Result, SourceContext};

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, MANIFEST_FILE)
    }
}

impl Manifest {
    /// Parse an fgen.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        parse_manifest(&content, &path.display().to_string())
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| ctx.parse_error(e))?;
    validate_manifest(&manifest, &ctx)?;
    Ok(manifest)
}

fn validate_manifest(manifest: &Manifest, ctx: &SourceContext) -> Result<()> {
    let project = &manifest.project;

    if project.name().trim().is_empty() {
        return Err(ctx.validation_error_at("project name must not be empty", project.name.span()));
    }

    if project.frameworks.get_ref().is_empty() {
        return Err(ctx.validation_error_at(
            "at least one target framework is required",
            project.frameworks.span(),
        ));
    }
    validate_segments(ctx, "framework", project.frameworks.get_ref())?;

    if let Some(configurations) = &project.configurations {
        if configurations.get_ref().is_empty() {
            return Err(ctx.validation_error_at(
                "configurations must not be empty; remove the key to use Debug and Release",
                configurations.span(),
            ));
        }
        validate_segments(ctx, "configuration", configurations.get_ref())?;
    }

    if let Some(folder) = &manifest.output.folder {
        if !is_path_segment(folder.get_ref()) {
            return Err(ctx.validation_error_at(
                "output folder must be a single directory name",
                folder.span(),
            ));
        }
    }

    if let Some(extension) = &manifest.output.extension {
        let ext = extension.get_ref();
        if !is_path_segment(ext) || ext.starts_with('.') {
            return Err(ctx.validation_error_at(
                "output extension must be a bare extension such as \"cs\"",
                extension.span(),
            ));
        }
    }

    Ok(())
}

/// Each value must be usable as a directory name, and listed once.
fn validate_segments(ctx: &SourceContext, list: &str, values: &[Spanned<String>]) -> Result<()> {
    for (i, value) in values.iter().enumerate() {
        if !is_path_segment(value.get_ref()) {
            return Err(ctx.validation_error_at(
                format!("invalid {list} '{}'", value.get_ref()),
                value.span(),
            ));
        }
        if let Some(first) = values[..i].iter().find(|v| v.get_ref() == value.get_ref()) {
            return Err(ctx.duplicate_error(list, value.get_ref(), first.span(), value.span()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Manifest> {
        parse_manifest(content, "fgen.toml")
    }

    #[test]
    fn test_parse_minimal() {
        let manifest: Manifest = r#"
            [project]
            name = "Reality.Services.UPx"
            frameworks = ["net7.0"]
        "#
        .parse()
        .unwrap();

        assert_eq!(manifest.project.name(), "Reality.Services.UPx");
        assert_eq!(manifest.project.frameworks(), ["net7.0"]);
        assert_eq!(manifest.project.configurations(), None);
        assert_eq!(manifest.project.sources(), ["."]);
        assert_eq!(manifest.project.exclude(), ["bin", "obj"]);
        assert_eq!(manifest.output.folder(), None);

        let project = manifest.to_project("/srv/upx");
        let targets: Vec<String> = project.build_targets().iter().map(|t| t.to_string()).collect();
        assert_eq!(targets, ["Debug/net7.0", "Release/net7.0"]);
    }

    #[test]
    fn test_parse_full() {
        let manifest = parse(
            r#"
            [project]
            name = "Reality.Services.Identity"
            frameworks = ["net7.0", "net8.0"]
            configurations = ["Debug"]
            sources = ["src"]
            exclude = ["bin", "obj", "node_modules"]

            [output]
            folder = "generated"
            extension = "g"
        "#,
        )
        .unwrap();

        assert_eq!(manifest.project.configurations(), Some(vec!["Debug".to_string()]));
        assert_eq!(manifest.project.exclude().len(), 3);
        assert_eq!(manifest.output.folder(), Some("generated"));
        assert_eq!(manifest.output.extension(), Some("g"));
        assert_eq!(manifest.to_project(".").build_targets().len(), 2);
    }

    #[test]
    fn test_unknown_keys_are_parse_errors() {
        let err = parse("[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\nlanguage = \"cs\"\n")
            .unwrap_err();
        assert!(matches!(*err, Error::Parse { span: Some(_), .. }));
    }

    #[test]
    fn test_empty_frameworks_rejected() {
        let err = parse("[project]\nname = \"P\"\nframeworks = []\n").unwrap_err();
        let Error::Validation { message, span, .. } = *err else {
            panic!("expected validation error");
        };
        assert!(message.contains("target framework"));
        assert!(span.is_some());
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = parse("[project]\nname = \"  \"\nframeworks = [\"net7.0\"]\n").unwrap_err();
        assert!(err.to_string().contains("project name"));
    }

    #[test]
    fn test_duplicate_configuration_points_at_both() {
        let src = "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\nconfigurations = [\"Debug\", \"Release\", \"Debug\"]\n";
        let err = parse(src).unwrap_err();
        let Error::Duplicate {
            list,
            value,
            first_span,
            second_span,
            ..
        } = *err
        else {
            panic!("expected duplicate error");
        };
        assert_eq!(list, "configuration");
        assert_eq!(value, "Debug");
        assert!(first_span.offset() < second_span.offset());
        assert_eq!(&src[first_span.offset()..first_span.offset() + first_span.len()], "\"Debug\"");
    }

    #[test]
    fn test_output_must_be_path_segments() {
        let base = "[project]\nname = \"P\"\nframeworks = [\"net7.0\"]\n";
        assert!(parse(&format!("{base}[output]\nfolder = \"../out\"\n")).is_err());
        assert!(parse(&format!("{base}[output]\nextension = \".cs\"\n")).is_err());
        assert!(parse(&format!("{base}[output]\nfolder = \"gen\"\nextension = \"cs\"\n")).is_ok());
    }

    #[test]
    fn test_invalid_framework_rejected() {
        let err = parse("[project]\nname = \"P\"\nframeworks = [\"net7.0/x\"]\n").unwrap_err();
        assert!(err.to_string().contains("invalid framework 'net7.0/x'"));
    }
}
