use crate::dicom::Tag;
use crate::fingerprint::FingerprintScope;
use crate::ingest::StoredUpload;
use clap::Parser;
use std::path::PathBuf;

/// Ingest DICOM files: detect duplicates, extract a tag and render PNG
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// DICOM file path(s) to ingest
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Process the stored upload with this id instead of ingesting files
    #[arg(long, value_name = "ID", conflicts_with_all = ["files", "random"])]
    pub stored: Option<String>,

    /// Process a randomly chosen stored upload instead of ingesting files
    #[arg(long, conflicts_with = "files")]
    pub random: bool,

    /// Tag to extract, as GGGG,EEEE or a keyword such as PatientName
    #[arg(short, long)]
    pub tag: Option<Tag>,

    /// Directory holding stored uploads and the registry snapshot
    #[arg(short, long, env = "DCMINGEST_UPLOADS", default_value = "uploads")]
    pub uploads: PathBuf,

    /// Write PNG renderings to this directory as <id>.png
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// What counts as a duplicate upload
    #[arg(long, value_enum, default_value_t = FingerprintScope::Dataset)]
    pub scope: FingerprintScope,

    /// Show image-related attributes
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Stored upload selected by `--stored` or `--random`
    #[must_use]
    pub fn stored_upload(&self) -> Option<StoredUpload> {
        match (&self.stored, self.random) {
            (Some(id), _) => Some(StoredUpload::Id(id.clone())),
            (None, true) => Some(StoredUpload::Random),
            (None, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["dcmingest", "a.dcm"]).unwrap();
        assert_eq!(args.files, vec![PathBuf::from("a.dcm")]);
        assert_eq!(args.tag, None);
        assert_eq!(args.scope, FingerprintScope::Dataset);
        assert!(args.output.is_none());
        assert!(!args.verbose);
        assert_eq!(args.stored_upload(), None);
    }

    #[test]
    fn test_stored_selection() {
        let args =
            Args::try_parse_from(["dcmingest", "--stored", "abc", "-t", "Modality"]).unwrap();
        assert!(args.files.is_empty());
        assert_eq!(args.stored_upload(), Some(StoredUpload::Id("abc".into())));

        let args = Args::try_parse_from(["dcmingest", "--random"]).unwrap();
        assert_eq!(args.stored_upload(), Some(StoredUpload::Random));

        assert!(Args::try_parse_from(["dcmingest", "--random", "a.dcm"]).is_err());
        assert!(Args::try_parse_from(["dcmingest", "--stored", "abc", "--random"]).is_err());
    }

    #[test]
    fn test_tag_forms() {
        let argv = ["dcmingest", "-t", "0010,0010", "--scope", "clinical", "a.dcm"];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.tag, Some(Tag(0x0010, 0x0010)));
        assert_eq!(args.scope, FingerprintScope::Clinical);

        let args = Args::try_parse_from(["dcmingest", "--tag", "PatientID", "a.dcm"]).unwrap();
        assert_eq!(args.tag, Some(Tag(0x0010, 0x0020)));

        assert!(Args::try_parse_from(["dcmingest", "-t", "bogus", "a.dcm"]).is_err());
    }
}
