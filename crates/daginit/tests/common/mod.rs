use daginit::{EV_RELEASE_ROOT, EV_RELEASE_VERSION, EnvSnapshot, ReleasePaths};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

pub const VERSION: &str = "9.9.9";

/// Writes an executable `/bin/sh` boot script with `body` into the release tree
pub fn install_boot_script(root: &Path, body: &str) -> ReleasePaths {
    let paths = ReleasePaths::new(root, VERSION);
    let script = paths.boot_script();
    std::fs::create_dir_all(script.parent().unwrap()).unwrap();
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    paths
}

pub fn env(root: &Path, extra: &[(&str, &str)]) -> EnvSnapshot {
    let root = root.to_str().unwrap().to_string();
    EnvSnapshot::from_vars(
        [(EV_RELEASE_ROOT, root.as_str()), (EV_RELEASE_VERSION, VERSION)]
            .into_iter()
            .chain(extra.iter().copied()),
    )
}
