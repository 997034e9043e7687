//! Filename derivation and collision resolution.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use catir_core::{
    ConfigError, MetadataRecord, NameTemplate, RenameConfig, Substitutions, Timestamp,
    TimestampError, Token,
};

use crate::context::DirectoryContext;
use crate::fs::Filesystem;

/// Characters of the base name kept when the seconds are re-rendered.
///
/// Matches the position of `{ss}` in the default template.
pub const SECONDS_OFFSET: usize = 17;

/// Path segment, counted from the end, that names the deployment.
pub const DEPLOYMENT_SEGMENT_FROM_END: usize = 5;

/// Why a collision could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The base name does not end in two digits before its extension.
    #[error("Cannot read seconds from '{base}'")]
    NoSeconds { base: String },
    /// Incrementing the seconds came back to a name already tried.
    #[error("Collision loop revisited '{path}'")]
    Cycle { path: PathBuf },
}

/// A filename before or after collision resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateName {
    /// Rendered template, `.ext` included, without the deployment prefix.
    pub base: String,
    /// `<deployment>_<base>`.
    pub file_name: String,
}

impl CandidateName {
    fn new(deployment: &str, base: String) -> Self {
        Self {
            file_name: format!("{deployment}_{base}"),
            base,
        }
    }
}

/// One step of the collision loop: `existing` was taken, `next` is tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionStep {
    pub existing: PathBuf,
    pub next: PathBuf,
}

/// Outcome of collision resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub name: CandidateName,
    pub steps: Vec<CollisionStep>,
}

/// Turns metadata records into collision-free filenames.
///
/// Holds the deployment name for the whole run. When it is not configured
/// it is taken from the first path the resolver builds and kept from then
/// on.
#[derive(Debug, Clone)]
pub struct NameResolver {
    template: NameTemplate,
    deployment: Option<String>,
}

impl NameResolver {
    /// Create a resolver from a full template (`.{ext}` included).
    pub fn new(template: NameTemplate, deployment: Option<String>) -> Self {
        Self {
            template,
            deployment,
        }
    }

    /// Create a resolver for a run configuration.
    pub fn from_config(config: &RenameConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.template()?, config.deployment_name.clone()))
    }

    /// The deployment name, once configured or derived.
    pub fn deployment_name(&self) -> Option<&str> {
        self.deployment.as_deref()
    }

    /// The template in use.
    pub fn template(&self) -> &NameTemplate {
        &self.template
    }

    /// Capture timestamp of a record: DateTimeOriginal, else DateTimeDigitized.
    pub fn derive_timestamp(&self, record: &MetadataRecord) -> Result<Timestamp, TimestampError> {
        Timestamp::from_record(record)
    }

    /// Values available to the template for one file.
    pub fn substitutions(
        &self,
        record: &MetadataRecord,
        timestamp: &Timestamp,
        context: &DirectoryContext,
        sequence: i64,
    ) -> Substitutions {
        let mut subs = Substitutions::new();
        subs.insert(Token::Artist, record.artist.clone().unwrap_or_default())
            .insert(Token::Make, record.make.clone().unwrap_or_default())
            .insert(Token::Model, record.model.clone().unwrap_or_default())
            .insert(Token::Folder, context.folder())
            .insert(Token::Seq, context.format_seq(sequence))
            .insert(Token::Ext, record.format.to_string())
            .insert(Token::Year, timestamp.year.clone())
            .insert(Token::Month, timestamp.month.clone())
            .insert(Token::Day, timestamp.day.clone())
            .insert(Token::Hour, timestamp.hour.clone())
            .insert(Token::Minute, timestamp.minute.clone())
            .insert(Token::Second, timestamp.second.clone());
        subs
    }

    /// Render the candidate name for one file.
    ///
    /// Derives the deployment name on first use.
    pub fn build_candidate(
        &mut self,
        record: &MetadataRecord,
        timestamp: &Timestamp,
        context: &DirectoryContext,
        sequence: i64,
    ) -> Result<(CandidateName, Substitutions), ConfigError> {
        let subs = self.substitutions(record, timestamp, context, sequence);
        let base = self.template.render(&subs);
        let deployment = self.ensure_deployment(&context.dir().join(&base))?;
        Ok((CandidateName::new(deployment, base), subs))
    }

    fn ensure_deployment(&mut self, first_path: &Path) -> Result<&str, ConfigError> {
        if self.deployment.is_none() {
            let derived = derive_deployment_name(first_path)?;
            debug!(deployment = %derived, from = %first_path.display(), "derived deployment name");
            self.deployment = Some(derived);
        }
        Ok(self.deployment.as_deref().unwrap_or_default())
    }

    /// Bump the seconds until no entry exists at `dir/<deployment>_<base>`.
    ///
    /// Seconds never carry into minutes: `59` becomes `60`.
    pub fn resolve_collision(
        &self,
        candidate: &CandidateName,
        dir: &Path,
        subs: &Substitutions,
        fs: &impl Filesystem,
    ) -> Result<Resolution, ResolveError> {
        let deployment = self.deployment.as_deref().unwrap_or_default();
        let ext = subs.get(Token::Ext);
        let mut current = candidate.clone();
        let mut steps = Vec::new();
        let mut tried = HashSet::new();

        loop {
            let path = dir.join(&current.file_name);
            if !fs.exists(&path) {
                return Ok(Resolution {
                    name: current,
                    steps,
                });
            }
            if !tried.insert(current.base.clone()) {
                return Err(ResolveError::Cycle { path });
            }

            let next = CandidateName::new(deployment, bump_seconds(&current.base, ext)?);
            let next_path = dir.join(&next.file_name);
            debug!(existing = %path.display(), next = %next_path.display(), "name collision");
            steps.push(CollisionStep {
                existing: path,
                next: next_path,
            });
            current = next;
        }
    }
}

/// Add one to the last two characters before the first `.` (fewer for a
/// shorter stem) and re-render them after the first [`SECONDS_OFFSET`]
/// characters.
pub fn bump_seconds(base: &str, ext: &str) -> Result<String, ResolveError> {
    let stem = base.split_once('.').map_or(base, |(stem, _)| stem);
    let chars: Vec<char> = stem.chars().collect();
    let no_seconds = || ResolveError::NoSeconds {
        base: base.to_string(),
    };

    let tail: String = chars[chars.len().saturating_sub(2)..].iter().collect();
    let seconds: u64 = tail.trim().parse().map_err(|_| no_seconds())?;
    let head: String = chars.iter().take(SECONDS_OFFSET).collect();

    Ok(format!("{head}{:02}.{ext}", seconds + 1))
}

/// The 5th-from-last segment of a path.
pub fn derive_deployment_name(path: &Path) -> Result<String, ConfigError> {
    let segments: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s),
            _ => None,
        })
        .collect();

    if segments.len() < DEPLOYMENT_SEGMENT_FROM_END {
        return Err(ConfigError::DeploymentNameUnderivable {
            path: path.to_path_buf(),
        });
    }
    Ok(segments[segments.len() - DEPLOYMENT_SEGMENT_FROM_END]
        .to_string_lossy()
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catir_core::ImageFormat;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::io;

    /// In-memory filesystem listing a fixed set of paths.
    #[derive(Default)]
    struct FakeFs {
        paths: RefCell<HashSet<PathBuf>>,
    }

    impl FakeFs {
        fn with(paths: impl IntoIterator<Item = PathBuf>) -> Self {
            Self {
                paths: RefCell::new(paths.into_iter().collect()),
            }
        }
    }

    impl Filesystem for FakeFs {
        fn exists(&self, path: &Path) -> bool {
            self.paths.borrow().contains(path)
        }

        fn commit(&self, _from: &Path, _to: &Path) -> io::Result<()> {
            Ok(())
        }
    }

    fn resolver() -> NameResolver {
        NameResolver::new(
            NameTemplate::with_extension(catir_core::DEFAULT_TIMESTAMP_FORMAT).unwrap(),
            Some("KLN".to_string()),
        )
    }

    fn record(ts: &str) -> MetadataRecord {
        MetadataRecord::builder()
            .format(ImageFormat::Jpeg)
            .date_time_original(ts)
            .build()
            .unwrap()
    }

    fn ctx() -> DirectoryContext {
        DirectoryContext::new(PathBuf::from("/data/site/KLN/CAM01/DCIM"), 12, 1)
    }

    #[test]
    fn test_build_candidate_default_template() {
        let mut resolver = resolver();
        let record = record("2023:04:05 06:07:08");
        let ts = resolver.derive_timestamp(&record).unwrap();

        let (candidate, subs) = resolver.build_candidate(&record, &ts, &ctx(), 1).unwrap();

        assert_eq!(candidate.base, "2023-04-05_06-07-08.JPEG");
        assert_eq!(candidate.file_name, "KLN_2023-04-05_06-07-08.JPEG");
        assert_eq!(subs.get(Token::Seq), "01");
        assert_eq!(subs.get(Token::Folder), "DCIM");
    }

    #[test]
    fn test_deployment_derived_once() {
        let mut resolver = NameResolver::new(
            NameTemplate::with_extension(catir_core::DEFAULT_TIMESTAMP_FORMAT).unwrap(),
            None,
        );
        let record = record("2023:04:05 06:07:08");
        let ts = resolver.derive_timestamp(&record).unwrap();

        let first_dir = PathBuf::from("/data/Project/DepA/Camera1/2023/DCIM");
        let first = DirectoryContext::new(first_dir.clone(), 3, 1);
        let (candidate, _) = resolver.build_candidate(&record, &ts, &first, 1).unwrap();
        assert_eq!(candidate.file_name, "DepA_2023-04-05_06-07-08.JPEG");

        // A deeper directory later in the run keeps the first derivation.
        let later = DirectoryContext::new(first_dir.join("extra"), 3, 1);
        let (candidate, _) = resolver.build_candidate(&record, &ts, &later, 1).unwrap();
        assert_eq!(candidate.file_name, "DepA_2023-04-05_06-07-08.JPEG");
        assert_eq!(resolver.deployment_name(), Some("DepA"));
    }

    #[test]
    fn test_derive_deployment_name() {
        assert_eq!(
            derive_deployment_name(Path::new("/a/b/c/d/e/f.jpg")).unwrap(),
            "b"
        );
        assert!(matches!(
            derive_deployment_name(Path::new("/a/b/c/f.jpg")),
            Err(ConfigError::DeploymentNameUnderivable { .. })
        ));
    }

    #[test]
    fn test_bump_seconds() {
        assert_eq!(
            bump_seconds("2023-04-05_06-07-08.JPEG", "JPEG").unwrap(),
            "2023-04-05_06-07-09.JPEG"
        );
        assert_eq!(
            bump_seconds("2023-04-05_06-07-59.JPEG", "JPEG").unwrap(),
            "2023-04-05_06-07-60.JPEG"
        );
        assert!(matches!(
            bump_seconds("CAM01_night.JPEG", "JPEG"),
            Err(ResolveError::NoSeconds { .. })
        ));
    }

    #[test]
    fn test_bump_seconds_short_stem() {
        // A one-character stem is its own seconds field.
        assert_eq!(bump_seconds("1.JPEG", "JPEG").unwrap(), "102.JPEG");
        assert_eq!(bump_seconds("7", "JPEG").unwrap(), "708.JPEG");
        assert!(matches!(
            bump_seconds(".JPEG", "JPEG"),
            Err(ResolveError::NoSeconds { .. })
        ));
    }

    #[test]
    fn test_resolve_no_collision() {
        let resolver = resolver();
        let candidate = CandidateName::new("KLN", "2023-04-05_06-07-08.JPEG".into());
        let mut subs = Substitutions::new();
        subs.insert(Token::Ext, "JPEG");

        let resolution = resolver
            .resolve_collision(&candidate, Path::new("/data"), &subs, &FakeFs::default())
            .unwrap();

        assert_eq!(resolution.name, candidate);
        assert!(resolution.steps.is_empty());
    }

    #[test]
    fn test_resolve_skips_taken_seconds() {
        let dir = Path::new("/data/CAM01");
        let taken = (0..=5).map(|s| dir.join(format!("KLN_2023-04-05_06-07-{s:02}.JPEG")));
        let fs = FakeFs::with(taken);

        let resolver = resolver();
        let candidate = CandidateName::new("KLN", "2023-04-05_06-07-00.JPEG".into());
        let mut subs = Substitutions::new();
        subs.insert(Token::Ext, "JPEG");

        let resolution = resolver.resolve_collision(&candidate, dir, &subs, &fs).unwrap();

        assert_eq!(resolution.name.file_name, "KLN_2023-04-05_06-07-06.JPEG");
        assert_eq!(resolution.steps.len(), 6);
        assert_eq!(
            resolution.steps[0].existing,
            dir.join("KLN_2023-04-05_06-07-00.JPEG")
        );
        assert_eq!(
            resolution.steps[5].next,
            dir.join("KLN_2023-04-05_06-07-06.JPEG")
        );
    }

    #[test]
    fn test_resolve_past_fifty_nine() {
        let dir = Path::new("/data/CAM01");
        let fs = FakeFs::with([dir.join("KLN_2023-04-05_06-07-59.JPEG")]);
        let resolver = resolver();
        let candidate = CandidateName::new("KLN", "2023-04-05_06-07-59.JPEG".into());
        let mut subs = Substitutions::new();
        subs.insert(Token::Ext, "JPEG");

        let resolution = resolver.resolve_collision(&candidate, dir, &subs, &fs).unwrap();
        assert_eq!(resolution.name.base, "2023-04-05_06-07-60.JPEG");
    }

    #[test]
    fn test_resolve_cycle_detected() {
        let dir = Path::new("/data/CAM01");
        // 99 -> 100 -> reads "00" -> 01 -> ... every name taken.
        let mut taken: Vec<PathBuf> = (0..=99)
            .map(|s| dir.join(format!("KLN_2023-04-05_06-07-{s:02}.JPEG")))
            .collect();
        taken.push(dir.join("KLN_2023-04-05_06-07-100.JPEG"));
        let fs = FakeFs::with(taken);

        let resolver = resolver();
        let candidate = CandidateName::new("KLN", "2023-04-05_06-07-99.JPEG".into());
        let mut subs = Substitutions::new();
        subs.insert(Token::Ext, "JPEG");

        assert!(matches!(
            resolver.resolve_collision(&candidate, dir, &subs, &fs),
            Err(ResolveError::Cycle { .. })
        ));
    }
}
