//! PDF first-page rendering via pdfium (feature `pdf`).
//!
//! pdfium is bound at runtime: the shared library is looked up next to the
//! executable first, then on the system library path. Only page index 0 is
//! ever rendered; later pages are ignored.

use super::capabilities::{CapabilityError, PdfRenderer};
use super::params::ScaleFactor;
use image::DynamicImage;

#[derive(Debug, Default)]
pub struct PdfiumRenderer;

impl PdfiumRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PdfRenderer for PdfiumRenderer {
    #[cfg(feature = "pdf")]
    fn render_first_page(
        &self,
        bytes: &[u8],
        scale: ScaleFactor,
    ) -> Result<DynamicImage, CapabilityError> {
        use pdfium_render::prelude::*;

        let failed = |e: PdfiumError| CapabilityError::Failed(format!("pdfium: {e}"));

        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(failed)?;
        let pdfium = Pdfium::new(bindings);
        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(failed)?;
        let pages = document.pages();
        tracing::debug!(page_count = pages.len(), "Rendering first PDF page");
        let page = pages.get(0).map_err(failed)?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale.value());
        let bitmap = page.render_with_config(&config).map_err(failed)?;
        Ok(DynamicImage::ImageRgba8(bitmap.as_image().to_rgba8()))
    }

    #[cfg(not(feature = "pdf"))]
    fn render_first_page(
        &self,
        _bytes: &[u8],
        _scale: ScaleFactor,
    ) -> Result<DynamicImage, CapabilityError> {
        Err(CapabilityError::Unavailable(
            "PDF rendering requires the `pdf` feature",
        ))
    }
}
