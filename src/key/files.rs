//! Key pair persistence.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::Result;

/// File name of the PKCS#8 private key.
pub const PRIVATE_KEY_FILE: &str = "private.pem";

/// File name of the SPKI public key.
pub const PUBLIC_KEY_FILE: &str = "public.pem";

/// Read both key files from `dir`. Returns `None` unless both exist and are
/// readable.
pub fn load(dir: &Path) -> Option<(String, String)> {
    let private_path = dir.join(PRIVATE_KEY_FILE);
    let public_path = dir.join(PUBLIC_KEY_FILE);
    if !private_path.exists() || !public_path.exists() {
        return None;
    }

    let read = |path: &Path| {
        fs::read_to_string(path)
            .map_err(|e| tracing::warn!("cannot read {}: {e}", path.display()))
            .ok()
    };
    Some((read(&private_path)?, read(&public_path)?))
}

/// Write the key pair to `dir`, creating the directory when missing. The
/// private key is written owner read/write only.
pub fn save(dir: &Path, private_pem: &str, public_pem: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    write_file(&dir.join(PRIVATE_KEY_FILE), private_pem, 0o600)?;
    write_file(&dir.join(PUBLIC_KEY_FILE), public_pem, 0o644)?;
    Ok(())
}

fn write_file(path: &Path, contents: &str, mode: u32) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;

    // `mode` only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        assert!(load(dir.path()).is_none());

        fs::write(dir.path().join(PRIVATE_KEY_FILE), "private").expect("should write");
        assert!(load(dir.path()).is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let key_dir = dir.path().join("nested").join("keys");

        save(&key_dir, "private", "public").expect("should save");
        let (private_pem, public_pem) = load(&key_dir).expect("should load");
        assert_eq!(private_pem, "private");
        assert_eq!(public_pem, "public");
    }

    #[cfg(unix)]
    #[test]
    fn file_modes() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("should create temp dir");
        save(dir.path(), "private", "public").expect("should save");

        let mode = |name: &str| {
            fs::metadata(dir.path().join(name)).expect("should stat").permissions().mode() & 0o777
        };
        assert_eq!(mode(PRIVATE_KEY_FILE), 0o600);
        assert_eq!(mode(PUBLIC_KEY_FILE), 0o644);
    }
}
