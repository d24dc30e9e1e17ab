//! Temporary off-screen surfaces for rasterizing card decorations.
//!
//! A surface lives exactly as long as one [`with_surface`] call, including when the render
//! callback fails or panics.

use anyhow::{Context, Result, bail};
use eframe::egui::{Color32, ColorImage};

pub trait SurfaceProvider {
    type Surface;

    fn create(&mut self, size: [usize; 2]) -> Result<Self::Surface>;

    fn destroy(&mut self, surface: Self::Surface);
}

/// Destroys its surface when dropped.
pub struct ScopedSurface<'a, P: SurfaceProvider> {
    provider: &'a mut P,
    surface: Option<P::Surface>,
}

impl<'a, P: SurfaceProvider> ScopedSurface<'a, P> {
    pub fn create(provider: &'a mut P, size: [usize; 2]) -> Result<Self> {
        let surface = provider
            .create(size)
            .with_context(|| format!("failed to create {}x{} surface", size[0], size[1]))?;
        Ok(Self {
            provider,
            surface: Some(surface),
        })
    }

    pub fn get_mut(&mut self) -> Option<&mut P::Surface> {
        self.surface.as_mut()
    }
}

impl<P: SurfaceProvider> Drop for ScopedSurface<'_, P> {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.provider.destroy(surface);
        }
    }
}

/// Creates a surface, hands it to `render`, and tears it down again before returning.
pub fn with_surface<P, T>(
    provider: &mut P,
    size: [usize; 2],
    render: impl FnOnce(&mut P::Surface) -> Result<T>,
) -> Result<T>
where
    P: SurfaceProvider,
{
    let mut scope = ScopedSurface::create(provider, size)?;
    let Some(surface) = scope.get_mut() else {
        bail!("surface already released");
    };
    render(surface)
}

/// CPU pixel buffers; counts how many are alive so leaks show up.
#[derive(Debug)]
pub struct PixelSurfaces {
    max_side: usize,
    clear: Color32,
    live: usize,
    created: usize,
}

impl PixelSurfaces {
    pub fn new(max_side: usize) -> Self {
        Self {
            max_side,
            clear: Color32::TRANSPARENT,
            live: 0,
            created: 0,
        }
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

impl Default for PixelSurfaces {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl SurfaceProvider for PixelSurfaces {
    type Surface = ColorImage;

    fn create(&mut self, size: [usize; 2]) -> Result<ColorImage> {
        let [width, height] = size;
        if width == 0 || height == 0 || width > self.max_side || height > self.max_side {
            bail!("surface size out of range (max side {})", self.max_side);
        }

        self.live += 1;
        self.created += 1;
        Ok(ColorImage::filled(size, self.clear))
    }

    fn destroy(&mut self, _surface: ColorImage) {
        self.live = self.live.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;

    #[test]
    fn surface_is_released_after_render() {
        let mut surfaces = PixelSurfaces::default();
        let pixels = with_surface(&mut surfaces, [4, 3], |image| Ok(image.pixels.len())).unwrap();
        assert_eq!(pixels, 12);
        assert_eq!(surfaces.live(), 0);
        assert_eq!(surfaces.created(), 1);
    }

    #[test]
    fn surface_is_released_when_render_fails() {
        let mut surfaces = PixelSurfaces::default();
        let result: Result<()> = with_surface(&mut surfaces, [8, 8], |_| bail!("card text overflow"));
        assert!(result.is_err());
        assert_eq!(surfaces.live(), 0);
    }

    #[test]
    fn surface_is_released_when_render_panics() {
        let mut surfaces = PixelSurfaces::default();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _ = with_surface(&mut surfaces, [8, 8], |_| -> Result<()> { panic!("boom") });
        }));
        assert!(outcome.is_err());
        assert_eq!(surfaces.live(), 0);
    }

    #[test]
    fn failed_creation_never_renders() {
        let mut surfaces = PixelSurfaces::new(16);
        let mut called = false;
        let result = with_surface(&mut surfaces, [32, 8], |_| {
            called = true;
            Ok(())
        });
        assert!(result.is_err());
        assert!(!called);
        assert_eq!(surfaces.created(), 0);
    }
}
