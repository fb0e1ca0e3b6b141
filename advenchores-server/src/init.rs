use std::fs;
use std::io::Write;
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../config.yaml.example");
const SECRET_PLACEHOLDER: &str = "change-this-to-a-long-random-secret";

fn generate_secret() -> String {
    // Two v4 UUIDs give 244 random bits
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

fn render_default_config() -> String {
    EXAMPLE_CONFIG.replace(SECRET_PLACEHOLDER, &generate_secret())
}

/// Writes the example config with a fresh secret to `config_path`.
/// Returns `Ok(false)` when the file exists and `force` is not set.
pub fn write_default_config(config_path: &Path, force: bool) -> Result<bool, String> {
    if config_path.exists() && !force {
        return Ok(false);
    }
    if let Some(dir) = config_path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|e| format!("create dir {}: {}", dir.display(), e))?;
    }
    let cfg = render_default_config();
    let mut f = fs::File::create(config_path)
        .map_err(|e| format!("write {}: {}", config_path.display(), e))?;
    f.write_all(cfg.as_bytes())
        .map_err(|e| format!("write {}: {}", config_path.display(), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(config_path, fs::Permissions::from_mode(0o640));
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use advenchores_server::server::AppConfig;

    #[test]
    fn rendered_config_has_fresh_secret() {
        let a = render_default_config();
        let b = render_default_config();
        assert!(!a.contains(SECRET_PLACEHOLDER));
        assert_ne!(a, b);
    }

    #[test]
    fn writes_once_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("config.yaml");
        assert!(write_default_config(&path, false).unwrap());
        let first = fs::read_to_string(&path).unwrap();
        assert!(!write_default_config(&path, false).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), first);
        assert!(write_default_config(&path, true).unwrap());
        assert_ne!(fs::read_to_string(&path).unwrap(), first);

        let cfg = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(cfg.jwt_secret.len(), 64);
    }
}
