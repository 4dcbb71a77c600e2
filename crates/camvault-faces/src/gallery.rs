//! The persisted gallery of known identities.
//!
//! The gallery keeps three index-aligned lists: full [`KnownFace`]
//! records, raw encodings, and names. A length mismatch between them is
//! a corruption error. Duplicate names are allowed (one person, several
//! enrollment images).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use camvault_models::{KnownFace, UNKNOWN_FACE};

use crate::detector::FaceDetector;
use crate::error::{FaceError, FaceResult};

/// Policy for enrollment images containing more than one face.
///
/// First-face-wins is an explicit, configurable choice here rather than a
/// hidden heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiFacePolicy {
    /// Use the first detected face and log a warning
    #[default]
    UseFirst,
    /// Reject the image outright
    Reject,
}

impl FromStr for MultiFacePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "use_first" | "first" => Ok(Self::UseFirst),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown multi-face policy: {other}")),
        }
    }
}

/// Outcome of matching one encoding against the gallery.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Matched identity, or [`UNKNOWN_FACE`]
    pub name: String,
    /// 1 - distance for accepted matches, 0.0 otherwise
    pub confidence: f32,
}

impl MatchResult {
    /// The no-match outcome.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_FACE.to_string(),
            confidence: 0.0,
        }
    }

    /// Whether a known identity was matched.
    pub fn is_match(&self) -> bool {
        self.name != UNKNOWN_FACE
    }
}

/// Outcome of a bulk enrollment run over a directory of images.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentReport {
    /// Images attempted
    pub processed: usize,
    /// Images enrolled successfully
    pub enrolled: usize,
    /// Images skipped because they were already enrolled
    pub skipped: usize,
    /// Images that failed detection or encoding
    pub failed: usize,
    /// One message per failed image
    pub errors: Vec<String>,
}

/// Result of a gallery consistency check.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Summary statistics for the gallery.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryStats {
    pub total_faces: usize,
    pub unique_names: usize,
    pub disk_size_bytes: u64,
    pub last_added: Option<DateTime<Utc>>,
    pub name_counts: HashMap<String, usize>,
}

/// On-disk gallery format: the three aligned lists plus a timestamp.
#[derive(Debug, Serialize, Deserialize)]
struct GalleryBlob {
    faces: Vec<KnownFace>,
    encodings: Vec<Vec<f32>>,
    names: Vec<String>,
    last_updated: DateTime<Utc>,
}

/// The known-face gallery.
#[derive(Debug, Default)]
pub struct FaceGallery {
    faces: Vec<KnownFace>,
    encodings: Vec<Vec<f32>>,
    names: Vec<String>,
    path: Option<PathBuf>,
    loaded: bool,
}

impl FaceGallery {
    /// Create an empty, unloaded gallery.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the gallery from `path`.
    ///
    /// A missing file is not an error: an empty gallery is created and
    /// persisted in its place. The target path is only recorded once the
    /// file parses, so a later `save()` cannot clobber a corrupt but
    /// recoverable blob with empty in-memory lists.
    pub fn load(&mut self, path: impl AsRef<Path>) -> FaceResult<()> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "Gallery file not found, creating new one");
            self.path = Some(path.to_path_buf());
            self.faces.clear();
            self.encodings.clear();
            self.names.clear();
            self.loaded = true;
            self.save()?;
            return Ok(());
        }

        let bytes = std::fs::read(path)?;
        let blob: GalleryBlob = serde_json::from_slice(&bytes)?;

        if blob.faces.len() != blob.encodings.len() || blob.encodings.len() != blob.names.len() {
            return Err(FaceError::Corrupt(format!(
                "aligned list lengths differ: {} faces, {} encodings, {} names",
                blob.faces.len(),
                blob.encodings.len(),
                blob.names.len()
            )));
        }

        self.path = Some(path.to_path_buf());
        self.faces = blob.faces;
        self.encodings = blob.encodings;
        self.names = blob.names;
        self.loaded = true;

        info!(
            path = %path.display(),
            known_faces = self.faces.len(),
            "Gallery loaded"
        );

        Ok(())
    }

    /// Persist the gallery to its configured path.
    pub fn save(&self) -> FaceResult<()> {
        let path = self.path.as_ref().ok_or(FaceError::NoGalleryPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let blob = GalleryBlob {
            faces: self.faces.clone(),
            encodings: self.encodings.clone(),
            names: self.names.clone(),
            last_updated: Utc::now(),
        };
        std::fs::write(path, serde_json::to_vec_pretty(&blob)?)?;

        Ok(())
    }

    /// Enroll a face from an image file.
    ///
    /// Detects faces in the image, encodes one region according to
    /// `policy`, appends the entry, and persists immediately.
    pub fn add(
        &mut self,
        detector: &FaceDetector,
        name: impl Into<String>,
        image_path: impl AsRef<Path>,
        description: impl Into<String>,
        confidence_threshold: f32,
        policy: MultiFacePolicy,
    ) -> FaceResult<()> {
        let name = name.into();
        let image_path = image_path.as_ref();

        let img = image::open(image_path)?;
        let regions = detector.detect(&img)?;

        let region = match regions.len() {
            0 => return Err(FaceError::NoFaceFound),
            1 => regions[0],
            n => match policy {
                MultiFacePolicy::UseFirst => {
                    warn!(
                        image = %image_path.display(),
                        faces = n,
                        "Multiple faces detected, using first one"
                    );
                    regions[0]
                }
                MultiFacePolicy::Reject => return Err(FaceError::MultipleFaces),
            },
        };

        let encoding = detector.encode(&img, &region)?;
        let face = KnownFace::new(
            name.clone(),
            encoding,
            confidence_threshold,
            description,
            image_path.to_string_lossy(),
        );
        self.push(face);
        self.save()?;

        info!(name = %name, "Known face added");
        Ok(())
    }

    /// Enroll every image file under `dir`, recursively.
    ///
    /// Identity names come from file stems. Per-file failures are
    /// collected in the report rather than aborting the batch, and
    /// images whose path is already recorded as an entry's source are
    /// skipped, so re-running over the same directory does not
    /// duplicate entries.
    pub fn add_directory(
        &mut self,
        detector: &FaceDetector,
        dir: impl AsRef<Path>,
        confidence_threshold: f32,
        policy: MultiFacePolicy,
    ) -> FaceResult<EnrollmentReport> {
        let dir = dir.as_ref();
        let mut report = EnrollmentReport::default();

        for image in enrollment_images(dir)? {
            let image_str = image.to_string_lossy();
            if self.faces.iter().any(|f| f.image_path == image_str) {
                report.skipped += 1;
                continue;
            }

            let Some(stem) = image.file_stem() else {
                continue;
            };
            let name = stem.to_string_lossy().into_owned();
            let file_name = image
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();

            report.processed += 1;
            match self.add(
                detector,
                &name,
                &image,
                format!("Auto-added from {file_name}"),
                confidence_threshold,
                policy,
            ) {
                Ok(()) => report.enrolled += 1,
                Err(err) => {
                    warn!(image = %image.display(), error = %err, "Enrollment failed");
                    report.failed += 1;
                    report.errors.push(format!("{}: {err}", image.display()));
                }
            }
        }

        info!(
            dir = %dir.display(),
            processed = report.processed,
            enrolled = report.enrolled,
            skipped = report.skipped,
            failed = report.failed,
            "Enrollment directory processed"
        );
        Ok(report)
    }

    /// Append an entry with a precomputed encoding. Does not persist;
    /// callers batching imports should `save()` afterwards.
    pub fn push(&mut self, face: KnownFace) {
        self.names.push(face.name.clone());
        self.encodings.push(face.encoding.clone());
        self.faces.push(face);
        self.loaded = true;
    }

    /// Remove every entry with the given name, compacting all three
    /// lists in lockstep. Persists; returns the number removed (zero
    /// removed is a no-op, not an error).
    pub fn remove(&mut self, name: &str) -> FaceResult<usize> {
        let before = self.faces.len();

        let faces = std::mem::take(&mut self.faces);
        let encodings = std::mem::take(&mut self.encodings);
        let names = std::mem::take(&mut self.names);
        for ((face, encoding), entry_name) in faces.into_iter().zip(encodings).zip(names) {
            if entry_name == name {
                continue;
            }
            self.faces.push(face);
            self.encodings.push(encoding);
            self.names.push(entry_name);
        }

        let removed = before - self.faces.len();
        if removed > 0 {
            self.save()?;
        }

        info!(name = %name, removed, "Known face removed");
        Ok(removed)
    }

    /// Match an encoding against the gallery.
    ///
    /// Candidates are entries within `tolerance` Euclidean distance; the
    /// closest wins (ties broken by gallery order). The winner's own
    /// `confidence_threshold` is then checked against 1 - distance, so a
    /// close-but-not-confident match is still rejected.
    pub fn match_encoding(&self, query: &[f32], tolerance: f32) -> MatchResult {
        if !self.loaded || self.encodings.is_empty() {
            return MatchResult::unknown();
        }

        let mut best: Option<(usize, f32)> = None;
        for (i, stored) in self.encodings.iter().enumerate() {
            let distance = euclidean_distance(query, stored);
            if distance > tolerance {
                continue;
            }
            // Strict < keeps the first occurrence on ties
            if best.map(|(_, d)| distance < d).unwrap_or(true) {
                best = Some((i, distance));
            }
        }

        match best {
            Some((index, distance)) => {
                let confidence = 1.0 - distance;
                let face = &self.faces[index];
                if confidence >= face.confidence_threshold {
                    MatchResult {
                        name: face.name.clone(),
                        confidence,
                    }
                } else {
                    MatchResult::unknown()
                }
            }
            None => MatchResult::unknown(),
        }
    }

    /// Update last-seen/times-seen on every entry with the given name.
    /// Returns the number of entries updated; does not persist.
    pub fn record_sighting(&mut self, name: &str) -> usize {
        let mut updated = 0;
        for face in self.faces.iter_mut().filter(|f| f.name == name) {
            face.record_sighting();
            updated += 1;
        }
        updated
    }

    /// Check list alignment and encoding quality.
    ///
    /// Misalignment and empty encodings are errors; duplicate names are
    /// permitted and reported only as warnings.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if self.faces.len() != self.encodings.len() {
            report.errors.push(format!(
                "face/encoding count mismatch: {} vs {}",
                self.faces.len(),
                self.encodings.len()
            ));
        }
        if self.encodings.len() != self.names.len() {
            report.errors.push(format!(
                "encoding/name count mismatch: {} vs {}",
                self.encodings.len(),
                self.names.len()
            ));
        }

        for (i, encoding) in self.encodings.iter().enumerate() {
            if encoding.is_empty() {
                report.errors.push(format!("empty encoding at index {i}"));
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for name in &self.names {
            *counts.entry(name.as_str()).or_insert(0) += 1;
        }
        for (name, count) in counts {
            if count > 1 {
                report
                    .warnings
                    .push(format!("{count} encodings enrolled for {name}"));
            }
        }

        report
    }

    /// Summary statistics for the gallery.
    pub fn statistics(&self) -> GalleryStats {
        let mut name_counts: HashMap<String, usize> = HashMap::new();
        for name in &self.names {
            *name_counts.entry(name.clone()).or_insert(0) += 1;
        }

        let disk_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        GalleryStats {
            total_faces: self.faces.len(),
            unique_names: name_counts.len(),
            disk_size_bytes,
            last_added: self.faces.iter().map(|f| f.added_at).max(),
            name_counts,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether the gallery has no entries.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Whether a load or create has happened.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The enrolled records.
    pub fn faces(&self) -> &[KnownFace] {
        &self.faces
    }
}

/// Extensions treated as enrollment images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// Image files under `dir`, recursively, in path order. A missing
/// directory yields an empty batch.
fn enrollment_images(dir: &Path) -> FaceResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    if dir.is_dir() {
        collect_images(dir, &mut images)?;
        images.sort();
    }
    Ok(images)
}

fn collect_images(dir: &Path, images: &mut Vec<PathBuf>) -> FaceResult<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_images(&path, images)?;
        } else if has_image_extension(&path) {
            images.push(path);
        }
    }
    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            let ext = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| ext == *known)
        })
        .unwrap_or(false)
}

/// Euclidean distance between two encodings. Length-mismatched pairs
/// are incomparable and report infinite distance, so a truncated stored
/// encoding can never win a match.
fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, encoding: Vec<f32>, threshold: f32) -> KnownFace {
        KnownFace::new(name, encoding, threshold, "", "test.jpg")
    }

    fn loaded_gallery(dir: &TempDir) -> FaceGallery {
        let mut gallery = FaceGallery::new();
        gallery.load(dir.path().join("gallery.json")).unwrap();
        gallery
    }

    #[test]
    fn test_load_creates_missing_gallery() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("faces").join("gallery.json");

        let mut gallery = FaceGallery::new();
        gallery.load(&path).unwrap();

        assert!(gallery.is_loaded());
        assert!(gallery.is_empty());
        assert!(path.exists(), "empty gallery should be persisted");
    }

    #[test]
    fn test_save_without_path_fails() {
        let gallery = FaceGallery::new();
        let err = gallery.save().unwrap_err();
        assert!(matches!(err, FaceError::NoGalleryPath));
    }

    #[test]
    fn test_round_trip_preserves_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gallery.json");

        let mut gallery = FaceGallery::new();
        gallery.load(&path).unwrap();
        gallery.push(entry("alice", vec![0.1, 0.2, 0.3], 0.6));
        gallery.push(entry("bob", vec![0.9, 0.8, 0.7], 0.7));
        gallery.save().unwrap();

        let mut reloaded = FaceGallery::new();
        reloaded.load(&path).unwrap();

        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.faces()[0].name, "alice");
        assert_eq!(reloaded.faces()[0].encoding, vec![0.1, 0.2, 0.3]);
        assert!((reloaded.faces()[1].confidence_threshold - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_misaligned_blob_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gallery.json");
        std::fs::write(
            &path,
            r#"{"faces":[],"encodings":[[0.1]],"names":[],"last_updated":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let mut gallery = FaceGallery::new();
        let err = gallery.load(&path).unwrap_err();
        assert!(matches!(err, FaceError::Corrupt(_)));
    }

    #[test]
    fn test_save_after_corrupt_load_preserves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gallery.json");
        let blob =
            r#"{"faces":[],"encodings":[[0.1]],"names":[],"last_updated":"2026-01-01T00:00:00Z"}"#;
        std::fs::write(&path, blob).unwrap();

        let mut gallery = FaceGallery::new();
        assert!(matches!(
            gallery.load(&path).unwrap_err(),
            FaceError::Corrupt(_)
        ));

        // The gallery never took ownership of the file, so saving fails
        // instead of replacing it with empty lists
        assert!(matches!(
            gallery.save().unwrap_err(),
            FaceError::NoGalleryPath
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), blob);
    }

    #[test]
    fn test_match_empty_gallery_is_unknown() {
        let gallery = FaceGallery::new();
        let result = gallery.match_encoding(&[0.0, 0.0], 0.6);
        assert!(!result.is_match());
        assert_eq!(result.name, UNKNOWN_FACE);
    }

    #[test]
    fn test_match_exact_encoding() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![1.0, 0.0, 0.0], 0.6));
        gallery.push(entry("bob", vec![0.0, 1.0, 0.0], 0.6));

        let result = gallery.match_encoding(&[1.0, 0.0, 0.0], 0.6);
        assert_eq!(result.name, "alice");
        assert!((result.confidence - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_match_beyond_tolerance_is_unknown() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![1.0, 0.0, 0.0], 0.6));

        let result = gallery.match_encoding(&[0.0, 0.0, 1.0], 0.6);
        assert!(!result.is_match());
    }

    #[test]
    fn test_match_close_but_not_confident_rejected() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        // Distance 0.5 is within tolerance 0.6, but confidence 0.5 is
        // below this entry's own threshold of 0.9
        gallery.push(entry("alice", vec![0.5, 0.0], 0.9));

        let result = gallery.match_encoding(&[0.0, 0.0], 0.6);
        assert!(!result.is_match());
    }

    #[test]
    fn test_match_perturbed_encoding() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![1.0, 0.0, 0.0], 0.6));
        gallery.push(entry("bob", vec![0.0, 1.0, 0.0], 0.6));

        // Small perturbation of alice's encoding
        let result = gallery.match_encoding(&[0.98, 0.02, 0.01], 0.6);
        assert_eq!(result.name, "alice");

        // Far from both
        let result = gallery.match_encoding(&[-1.0, -1.0, -1.0], 0.6);
        assert!(!result.is_match());
    }

    #[test]
    fn test_match_tie_prefers_first_entry() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("first", vec![1.0, 0.0], 0.0));
        gallery.push(entry("second", vec![1.0, 0.0], 0.0));

        let result = gallery.match_encoding(&[1.0, 0.0], 0.6);
        assert_eq!(result.name, "first");
    }

    #[test]
    fn test_match_length_mismatched_encoding_never_wins() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        // A truncated stored encoding must not look artificially close
        gallery.push(entry("truncated", vec![1.0], 0.0));

        let result = gallery.match_encoding(&[1.0, 0.9, 0.9], 0.6);
        assert!(!result.is_match());

        assert!(euclidean_distance(&[1.0], &[1.0, 2.0]).is_infinite());
    }

    #[test]
    fn test_enrollment_image_discovery() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("alice.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("nested").join("bob.PNG"), b"x").unwrap();

        let images = enrollment_images(dir.path()).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.iter().any(|p| p.ends_with("alice.jpg")));
        assert!(images.iter().any(|p| p.ends_with("bob.PNG")));

        // Missing directory is an empty batch, not an error
        let absent = enrollment_images(&dir.path().join("absent")).unwrap();
        assert!(absent.is_empty());
    }

    #[test]
    fn test_remove_deletes_all_matching_entries() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![0.1], 0.6));
        gallery.push(entry("bob", vec![0.2], 0.6));
        gallery.push(entry("alice", vec![0.3], 0.6));

        let removed = gallery.remove("alice").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery.faces()[0].name, "bob");
        assert_eq!(gallery.faces()[0].encoding, vec![0.2]);

        // Absent name is a no-op
        assert_eq!(gallery.remove("carol").unwrap(), 0);
    }

    #[test]
    fn test_validate_reports_duplicates_as_warnings() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![0.1], 0.6));
        gallery.push(entry("alice", vec![0.2], 0.6));

        let report = gallery.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("alice"));
    }

    #[test]
    fn test_validate_flags_empty_encoding() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![], 0.6));

        let report = gallery.validate();
        assert!(!report.is_valid());
        assert!(report.errors[0].contains("empty encoding"));
    }

    #[test]
    fn test_record_sighting_updates_all_entries() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![0.1], 0.6));
        gallery.push(entry("alice", vec![0.2], 0.6));
        gallery.push(entry("bob", vec![0.3], 0.6));

        assert_eq!(gallery.record_sighting("alice"), 2);
        assert_eq!(gallery.faces()[0].times_seen, 1);
        assert_eq!(gallery.faces()[2].times_seen, 0);
    }

    #[test]
    fn test_statistics() {
        let dir = TempDir::new().unwrap();
        let mut gallery = loaded_gallery(&dir);
        gallery.push(entry("alice", vec![0.1], 0.6));
        gallery.push(entry("alice", vec![0.2], 0.6));
        gallery.push(entry("bob", vec![0.3], 0.6));
        gallery.save().unwrap();

        let stats = gallery.statistics();
        assert_eq!(stats.total_faces, 3);
        assert_eq!(stats.unique_names, 2);
        assert_eq!(stats.name_counts["alice"], 2);
        assert!(stats.disk_size_bytes > 0);
        assert!(stats.last_added.is_some());
    }

    #[test]
    fn test_multi_face_policy_parsing() {
        assert_eq!(
            "use_first".parse::<MultiFacePolicy>().unwrap(),
            MultiFacePolicy::UseFirst
        );
        assert_eq!(
            "reject".parse::<MultiFacePolicy>().unwrap(),
            MultiFacePolicy::Reject
        );
        assert!("maybe".parse::<MultiFacePolicy>().is_err());
    }
}
