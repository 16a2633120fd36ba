//! Static export: every route rendered to files.
//!
//! ```text
//! dist/
//! ├── index.html                 # /
//! ├── blog/
//! │   ├── index.html             # /blog
//! │   └── <slug>/index.html      # /blog/<slug>
//! └── …                          # copied from public_dir
//! ```
//!
//! Canonical URLs use the configured `site.origin`. Posts that fail to
//! compile are reported and skipped; the rest of the export continues.

use crate::error::PostError;
use crate::site::Site;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What an export wrote.
#[derive(Debug, Default)]
pub struct ExportReport {
    /// Pages written, relative to the output directory.
    pub pages: Vec<PathBuf>,
    pub failures: Vec<PostError>,
    /// Number of files copied from `public_dir`.
    pub assets: usize,
}

pub fn export(site: &Site, out_dir: &Path) -> Result<ExportReport, ExportError> {
    let origin = site.config().site.origin.as_str();
    let mut report = ExportReport::default();

    let public_dir = &site.config().public_dir;
    if public_dir.is_dir() {
        report.assets = copy_dir_recursive(public_dir, out_dir)?;
    }

    write_page(
        out_dir,
        Path::new("index.html"),
        &site.home_page(origin).into_string(),
        &mut report,
    )?;
    write_page(
        out_dir,
        Path::new("blog/index.html"),
        &site.blog_index(origin).into_string(),
        &mut report,
    )?;

    for slug in site.compiler().registry().list_slugs() {
        match site.post_page(slug, origin) {
            Ok(page) => {
                let relative = Path::new("blog").join(slug).join("index.html");
                write_page(out_dir, &relative, &page.into_string(), &mut report)?;
            }
            Err(e) => {
                log::warn!("skipping '{slug}': {e}");
                report.failures.push(e);
            }
        }
    }

    log::info!(
        "exported {} pages and {} assets to {}",
        report.pages.len(),
        report.assets,
        out_dir.display()
    );
    Ok(report)
}

fn write_page(
    out_dir: &Path,
    relative: &Path,
    html: &str,
    report: &mut ExportReport,
) -> Result<(), ExportError> {
    let path = out_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(&path, html).map_err(io_err(&path))?;
    log::debug!("wrote {}", path.display());
    report.pages.push(relative.to_path_buf());
    Ok(())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + use<> {
    let path = path.to_path_buf();
    move |source| ExportError::Io { path, source }
}

/// Copy `src` into `dst`, returning the number of files copied.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize, ExportError> {
    fs::create_dir_all(dst).map_err(io_err(dst))?;
    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(io_err(src))? {
        let entry = entry.map_err(io_err(src))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).map_err(io_err(&dst_path))?;
            copied += 1;
        }
    }
    Ok(copied)
}
