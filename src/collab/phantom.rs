/// Phantom lookup
///
/// Phantoms are directories under a root, each holding a `T1.nii.gz` volume.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::{PhantomImage, PhantomRenderer};

const VOLUME_FILE: &str = "T1.nii.gz";

#[derive(Debug, Clone)]
pub struct PhantomLibrary {
    root: PathBuf,
}

impl PhantomLibrary {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Names of phantoms that have a volume on disk, sorted
    pub fn list(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.root) {
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_dir() && p.join(VOLUME_FILE).is_file() {
                    if let Some(name) = p.file_name() {
                        names.push(name.to_string_lossy().to_string());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl PhantomRenderer for PhantomLibrary {
    fn display(&self, name: &str) -> Result<PhantomImage, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("No phantom selected".to_string());
        }
        if !is_plain_name(name) {
            return Err(format!("Invalid phantom name: {}", name));
        }
        let path = self.root.join(name).join(VOLUME_FILE);
        if !path.is_file() {
            return Err(format!("Phantom volume not found: {}", path.display()));
        }
        log::info!("Phantom {} -> {}", name, path.display());
        Ok(PhantomImage {
            name: name.to_string(),
            path,
        })
    }

    fn available(&self) -> Vec<String> {
        self.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> (PhantomLibrary, PathBuf) {
        let root = std::env::temp_dir().join(format!("seq_editor_phantoms_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(root.join("brain")).unwrap();
        fs::write(root.join("brain").join(VOLUME_FILE), b"nii").unwrap();
        fs::create_dir_all(root.join("empty")).unwrap();
        (PhantomLibrary::new(root.clone()), root)
    }

    #[test]
    fn test_display_resolves_volume() {
        let (lib, root) = library();
        let image = lib.display("brain").unwrap();
        assert_eq!(image.name, "brain");
        assert_eq!(image.path, root.join("brain").join("T1.nii.gz"));
        assert_eq!(lib.available(), vec!["brain".to_string()]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_missing_and_invalid_names() {
        let (lib, root) = library();
        assert!(lib.display("empty").unwrap_err().contains("not found"));
        assert!(lib.display("").is_err());
        assert!(lib.display("../brain").unwrap_err().contains("Invalid"));
        assert!(lib.display("brain/T1.nii.gz").is_err());
        let _ = fs::remove_dir_all(&root);
    }
}
