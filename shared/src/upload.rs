use crate::error::ValidationError;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "dcm", "dicom"];
pub const MAX_UPLOAD_BYTES: u64 = 50_000_000;
pub const MIN_PASSWORD_LEN: usize = 6;

/// A file that passed local checks and may be sent to `POST /upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub file_name: String,
    pub extension: String,
    pub size: u64,
}

impl UploadCandidate {
    pub fn is_dicom(&self) -> bool {
        matches!(self.extension.as_str(), "dcm" | "dicom")
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Type check first, then size; no network involved.
pub fn validate_upload(file_name: &str, size: u64) -> Result<UploadCandidate, ValidationError> {
    let extension = match extension_of(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => ext,
        other => return Err(ValidationError::InvalidFileType { extension: other }),
    };

    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge { size });
    }

    Ok(UploadCandidate {
        file_name: file_name.to_string(),
        extension,
        size,
    })
}

pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(ValidationError::InvalidEmail),
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Turns transport byte counts into a 0-100 value that never goes backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadProgress {
    percent: u8,
}

impl UploadProgress {
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Returns the new percentage when it moved forward.
    pub fn update(&mut self, loaded: f64, total: f64) -> Option<u8> {
        if !(total > 0.0) || !loaded.is_finite() {
            return None;
        }
        let next = ((loaded * 100.0) / total).round().clamp(0.0, 100.0) as u8;
        if next > self.percent {
            self.percent = next;
            Some(next)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_extensions_any_case() {
        for name in ["a.png", "b.JPG", "c.Jpeg", "scan.DCM", "x.dicom", "archive.tar.png"] {
            assert!(validate_upload(name, 1024).is_ok(), "{name} should pass");
        }
        let candidate = validate_upload("SPINE.DICOM", 10).unwrap();
        assert_eq!(candidate.extension, "dicom");
        assert!(candidate.is_dicom());
    }

    #[test]
    fn test_rejects_other_extensions() {
        for name in ["a.gif", "b.webp", "report.pdf", "noext", "trailing.", "png"] {
            assert!(
                matches!(
                    validate_upload(name, 10),
                    Err(ValidationError::InvalidFileType { .. })
                ),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_size_ceiling() {
        assert!(validate_upload("a.png", MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate_upload("a.png", MAX_UPLOAD_BYTES + 1),
            Err(ValidationError::FileTooLarge {
                size: MAX_UPLOAD_BYTES + 1
            })
        );
    }

    #[test]
    fn test_type_checked_before_size() {
        assert!(matches!(
            validate_upload("huge.gif", MAX_UPLOAD_BYTES * 2),
            Err(ValidationError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_registration_checks() {
        assert_eq!(validate_registration("a@b.co", "secret1", "secret1"), Ok(()));
        assert_eq!(
            validate_registration("a@b.co", "secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_registration("a@b.co", "abc", "abc"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            validate_registration("not-an-email", "secret1", "secret1"),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut progress = UploadProgress::default();
        assert_eq!(progress.update(25.0, 100.0), Some(25));
        assert_eq!(progress.update(10.0, 100.0), None);
        assert_eq!(progress.percent(), 25);
        assert_eq!(progress.update(100.0, 100.0), Some(100));
        assert_eq!(progress.update(150.0, 100.0), None);
        assert_eq!(progress.update(1.0, 0.0), None);
        assert_eq!(progress.percent(), 100);
    }
}
