use crate::model::{Rules, DEFAULT_ADOPT_COST};
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Default)]
#[command(name = "flamingos", about = "Adopt flamingos and teach them to dance")]
pub(crate) struct Args {
    /// seed for the reward rolls (default: from settings)
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// frames per second for the auto-refreshing view
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// coins charged per adoption
    #[arg(long)]
    pub(crate) adopt_cost: Option<u32>,

    /// draw without colors
    #[arg(long)]
    pub(crate) no_color: bool,

    /// write the log here instead of the data directory
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) seed: u64,
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) adopt_cost: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0xF1A_3160_u64,
            fps_cap: 30,
            enable_color: true,
            adopt_cost: DEFAULT_ADOPT_COST,
        }
    }
}

impl Settings {
    /// Command-line flags win over the settings file.
    pub(crate) fn apply_args(&mut self, args: &Args) {
        if let Some(seed) = args.seed {
            self.seed = seed;
        }
        if let Some(fps) = args.fps {
            self.fps_cap = fps;
        }
        if let Some(cost) = args.adopt_cost {
            self.adopt_cost = cost;
        }
        if args.no_color {
            self.enable_color = false;
        }
    }

    pub(crate) fn rules(&self) -> Rules {
        Rules {
            adopt_cost: self.adopt_cost,
        }
    }
}

/// Settings as read from disk. `path` is only set when the file loaded
/// cleanly or did not exist yet, so a file we could not parse is left alone.
#[derive(Clone, Debug)]
pub(crate) struct StoredSettings {
    pub(crate) settings: Settings,
    pub(crate) path: Option<PathBuf>,
}

impl StoredSettings {
    pub(crate) fn write_back(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_settings_atomic(path, &self.settings),
            None => Ok(()),
        }
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "flamingos", "Flamingos")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("flamingos.log"),
    })
}

/// Missing file means first run and yields defaults. An unreadable or
/// malformed file is an error for the caller to report.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let settings =
        serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(settings)
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // Same-filesystem rename; Windows will not rename over an existing file.
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}
