use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, ensure};
use eframe::egui::{self, ColorImage, Context};
use tracing::{info, warn};

use contact_graph::engine::GraphControls;

use super::{ExportState, ViewModel};

impl ViewModel {
    pub(in crate::app) fn request_export(&mut self, ctx: &Context) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
        self.export = ExportState::Requested;
    }

    /// Writes the primary surface out of a delivered screenshot, if one is
    /// pending.
    pub(in crate::app) fn collect_export(&mut self, ctx: &Context, snapshot_path: &Path) {
        if !matches!(self.export, ExportState::Requested) {
            return;
        }

        let image = ctx.input(|input| {
            input.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(Arc::clone(image)),
                _ => None,
            })
        });
        let Some(image) = image else {
            ctx.request_repaint();
            return;
        };

        let Some(surface) = self
            .engine
            .as_ref()
            .and_then(|engine| engine.surface_rect(engine.primary_surface()))
        else {
            self.export = ExportState::Failed("no primary surface to export".to_owned());
            return;
        };

        let cropped = image.region(&surface, Some(ctx.pixels_per_point()));
        let path = export_path(snapshot_path);
        self.export = match write_ppm(&path, &cropped) {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    width = cropped.size[0],
                    height = cropped.size[1],
                    "exported network view"
                );
                ExportState::Saved(path)
            }
            Err(error) => {
                warn!("{error:#}");
                ExportState::Failed(format!("{error:#}"))
            }
        };
    }
}

pub(in crate::app) fn export_path(snapshot_path: &Path) -> PathBuf {
    snapshot_path.with_extension("view.ppm")
}

/// Binary PPM, alpha dropped.
pub(in crate::app) fn write_ppm(path: &Path, image: &ColorImage) -> Result<()> {
    let [width, height] = image.size;
    ensure!(width > 0 && height > 0, "cannot export an empty image");

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write!(writer, "P6\n{width} {height}\n255\n")?;
    for pixel in &image.pixels {
        let [r, g, b, _] = pixel.to_array();
        writer.write_all(&[r, g, b])?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_path_sits_next_to_snapshot() {
        let path = export_path(Path::new("/data/network.json"));
        assert_eq!(path, PathBuf::from("/data/network.view.ppm"));
    }

    #[test]
    fn writes_header_and_rgb_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.ppm");
        let image = ColorImage::from_rgba_unmultiplied([2, 1], &[255, 0, 0, 255, 1, 2, 3, 255]);

        write_ppm(&path, &image).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&bytes[..header.len()], header);
        assert_eq!(&bytes[header.len()..], &[255, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn empty_image_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let image = ColorImage::from_rgba_unmultiplied([0, 0], &[]);
        assert!(write_ppm(&dir.path().join("empty.ppm"), &image).is_err());
    }
}
