//! A map surface that draws its overlays onto a PNG.

use std::{collections::BTreeMap, f32::consts::PI, fs::{self, File}, path::Path};

use log::{info, warn};
use raqote::{DrawOptions, DrawTarget, Image, LineCap, LineJoin, PathBuilder, SolidSource, Source, StrokeStyle};

use crate::{
    config::UserConfig,
    data::semantic::MapCoords,
    errors::Result,
    filter::group_by,
    map::{Color, MapSurface, Marker, Overlay, OverlayId, Ring},
    spatial::{meters_to_degrees_approx, Bounds},
};

mod fk {
    pub use font_kit::canvas::{Canvas, Format, RasterizationOptions};
    pub use font_kit::font::Font;
    pub use font_kit::hinting::HintingOptions;
    pub use pathfinder_geometry::transform2d::Transform2F;
    pub use pathfinder_geometry::vector::{vec2f, vec2i};
}

const TILE_SIZE_PX: f64 = 256.0;
const CLUSTER_CELL_PX: f32 = 80.0;
const BADGE_RADIUS_PX: f32 = 20.0;
const BADGE_POINT_SIZE: f32 = 16.0;

fn solid(color: Color) -> SolidSource {
    SolidSource::from_unpremultiplied_argb(color.a, color.r, color.g, color.b)
}

fn stroke(width: f32) -> StrokeStyle {
    StrokeStyle {
        cap: LineCap::Round,
        join: LineJoin::Round,
        width,
        miter_limit: 2.0,
        dash_array: Vec::new(),
        dash_offset: 0.0,
    }
}

/// Keeps overlays like any other surface and rasterises them on demand. The view is a
/// plate carrée projection around `center`, scaled like web map zoom levels.
pub struct PngMap {
    width_px: i32,
    height_px: i32,
    center: MapCoords,
    zoom: f64,
    next_id: u64,
    overlays: BTreeMap<OverlayId, Overlay>,
    font: Option<fk::Font>,
}

impl PngMap {
    pub fn new(user_config: &UserConfig) -> Result<PngMap> {
        let font = match &user_config.font_path {
            Some(path) => match Self::load_font(path) {
                Ok(font) => Some(font),
                Err(err) => {
                    warn!(path = path.as_str(), err = err.message.as_str(); "Could not load font, badges will have no counts");
                    None
                },
            },
            None => None,
        };

        Ok(PngMap {
            width_px: user_config.width_px.try_into()?,
            height_px: user_config.height_px.try_into()?,
            center: user_config.view.center(),
            zoom: user_config.view.zoom,
            next_id: 0,
            overlays: BTreeMap::new(),
            font,
        })
    }

    fn load_font(path: &str) -> Result<fk::Font> {
        let font: fk::Font = font_kit::loader::Loader::from_file(&mut File::open(path)?, 0)?;
        Ok(font)
    }

    pub fn center(&self) -> MapCoords {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    fn px_per_deg_at(zoom: f64) -> f64 {
        TILE_SIZE_PX * 2f64.powf(zoom) / 360.0
    }

    fn px_per_deg(&self) -> f64 {
        Self::px_per_deg_at(self.zoom)
    }

    fn project(&self, coords: &MapCoords) -> (f32, f32) {
        let rel_lon = coords.lon - self.center.lon;
        let rel_lat = coords.lat - self.center.lat;

        let x = rel_lon * self.px_per_deg() + f64::from(self.width_px) / 2.0;
        let y = - rel_lat * self.px_per_deg() + f64::from(self.height_px) / 2.0;
        (x as f32, y as f32)
    }

    fn draw_circle(dt: &mut DrawTarget, x: f32, y: f32, radius: f32, color: Color, fill_opacity: f32, weight: f32) {
        let mut pb = PathBuilder::new();
        pb.arc(x, y, radius, 0.0, 2.0 * PI);
        pb.close();
        let path = pb.finish();

        let mut fill_options = DrawOptions::new();
        fill_options.alpha = fill_opacity;
        dt.fill(&path, &Source::Solid(solid(color)), &fill_options);
        if weight > 0.0 {
            dt.stroke(&path, &Source::Solid(solid(color)), &stroke(weight), &DrawOptions::new());
        }
    }

    fn draw_ring(&self, dt: &mut DrawTarget, ring: &Ring) {
        let (x, y) = self.project(&ring.center);
        let radius = meters_to_degrees_approx(ring.radius_m) * self.px_per_deg();
        Self::draw_circle(dt, x, y, radius as f32, ring.color, ring.fill_opacity, 2.0);
    }

    fn draw_marker(&self, dt: &mut DrawTarget, marker: &Marker) {
        let (x, y) = self.project(&marker.position);
        Self::draw_circle(dt, x, y, marker.radius_px, marker.color, marker.fill_opacity, marker.weight);
    }

    fn draw_cluster(&self, dt: &mut DrawTarget, markers: &[Marker]) -> Result<()> {
        let cells = group_by(markers.iter(), |marker| {
            let (x, y) = self.project(&marker.position);
            ((x / CLUSTER_CELL_PX).floor() as i64, (y / CLUSTER_CELL_PX).floor() as i64)
        });
        for cell in cells {
            match cell.members.as_slice() {
                [marker] => self.draw_marker(dt, marker),
                members => self.draw_badge(dt, members)?,
            }
        }
        Ok(())
    }

    fn draw_badge(&self, dt: &mut DrawTarget, members: &[&Marker]) -> Result<()> {
        let Some(first) = members.first() else {
            return Ok(());
        };
        let positions: Vec<MapCoords> = members.iter().map(|marker| marker.position).collect();
        let (x, y) = match Bounds::around(&positions) {
            Some(bounds) => self.project(&bounds.center()),
            None => self.project(&first.position),
        };

        Self::draw_circle(dt, x, y, BADGE_RADIUS_PX, first.color, 1.0, 0.0);
        let mut ring = PathBuilder::new();
        ring.arc(x, y, BADGE_RADIUS_PX, 0.0, 2.0 * PI);
        ring.close();
        dt.stroke(&ring.finish(), &Source::Solid(solid(Color::WHITE)), &stroke(2.0), &DrawOptions::new());

        self.draw_text(dt, x, y, BADGE_POINT_SIZE, &members.len().to_string())
    }

    /// Draws white text centered on (x, y). Without a font this draws nothing.
    fn draw_text(&self, dt: &mut DrawTarget, x: f32, y: f32, point_size: f32, text: &str) -> Result<()> {
        let Some(font) = &self.font else {
            return Ok(());
        };
        let units_per_em = font.metrics().units_per_em as f32;

        let mut glyphs = Vec::new();
        let mut pen = 0.0_f32;
        for c in text.chars() {
            if let Some(id) = font.glyph_for_char(c) {
                glyphs.push((id, pen));
                pen += font.advance(id)?.x() * point_size / units_per_em;
            }
        }

        let width = pen.ceil() as i32 + 2;
        let height = (point_size * 1.5).ceil() as i32;
        if width <= 2 {
            return Ok(());
        }
        let mut canvas = fk::Canvas::new(fk::vec2i(width, height), fk::Format::A8);
        for (id, offset) in glyphs {
            font.rasterize_glyph(
                &mut canvas,
                id,
                point_size,
                fk::Transform2F::from_translation(fk::vec2f(offset + 1.0, point_size)),
                fk::HintingOptions::None,
                fk::RasterizationOptions::GrayscaleAa,
            )?;
        }

        let mut data = vec![0_u32; (width * height) as usize];
        for row in 0..height as usize {
            for col in 0..width as usize {
                let a = canvas.pixels[row * canvas.stride + col] as u32;
                data[row * width as usize + col] = (a << 24) | (a << 16) | (a << 8) | a;
            }
        }
        let img = Image {
            width,
            height,
            data: &data,
        };
        dt.draw_image_at(
            x - width as f32 / 2.0,
            y - point_size * 0.75,
            &img,
            &DrawOptions::new(),
        );
        Ok(())
    }

    pub fn render(&self) -> Result<DrawTarget> {
        let mut dt = DrawTarget::new(self.width_px, self.height_px);

        dt.clear(SolidSource::from_unpremultiplied_argb(
            0xff, 0xf2, 0xef, 0xe9,
        ));

        for overlay in self.overlays.values() {
            if let Overlay::Ring(ring) = overlay {
                self.draw_ring(&mut dt, ring);
            }
        }
        for overlay in self.overlays.values() {
            match overlay {
                Overlay::Layer(markers) => markers.iter().for_each(|marker| self.draw_marker(&mut dt, marker)),
                Overlay::Cluster(markers) => self.draw_cluster(&mut dt, markers)?,
                Overlay::Marker(_) | Overlay::Ring(_) => (),
            }
        }
        // Single markers are highlights and go on top.
        for overlay in self.overlays.values() {
            if let Overlay::Marker(marker) = overlay {
                self.draw_marker(&mut dt, marker);
            }
        }
        Ok(dt)
    }

    pub fn write_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let dt = self.render()?;
        dt.write_png(path).map_err(|_| "Couldn't write png. (encoding error)")?;
        info!(path = path.display().to_string().as_str(), overlays = self.overlays.len(); "Wrote map");
        Ok(())
    }
}

impl MapSurface for PngMap {
    fn add_overlay(&mut self, overlay: Overlay) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.overlays.insert(id, overlay);
        id
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.remove(&id);
    }

    /// Centers on the bounds and picks the largest whole zoom level, up to `max_zoom`,
    /// at which they fit inside the padded view.
    fn fit_bounds(&mut self, bounds: &Bounds, padding_px: f32, max_zoom: f64) {
        self.center = bounds.center();
        let usable_width = (self.width_px as f64 - 2.0 * padding_px as f64).max(1.0);
        let usable_height = (self.height_px as f64 - 2.0 * padding_px as f64).max(1.0);
        let span_lon = bounds.east - bounds.west;
        let span_lat = bounds.north - bounds.south;

        let mut zoom = max_zoom.floor();
        while zoom > 0.0 {
            let ppd = Self::px_per_deg_at(zoom);
            if span_lon * ppd <= usable_width && span_lat * ppd <= usable_height {
                break;
            }
            zoom -= 1.0;
        }
        self.zoom = zoom.max(0.0);
    }
}
