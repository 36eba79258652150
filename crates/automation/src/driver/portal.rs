//! Production upload driver: one file's sequence against the portal.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use tilebot_browser::UiSurface;
use tilebot_core::job::BatchMetadata;
use tilebot_core::UploadVariant;

use crate::driver::selectors::{self, VariantSelectors, SKIP_REASON_EMPTY_ALAMAT,
    UPLOAD_SECTION_XPATH};
use crate::driver::{DriverError, UploadDriver, UploadOutcome};
use crate::registry::RunControl;

/// Walks the portal's upload form for one variant.
pub struct PortalUploadDriver {
    surface: Arc<dyn UiSurface>,
    selectors: &'static VariantSelectors,
}

impl PortalUploadDriver {
    pub fn new(surface: Arc<dyn UiSurface>, variant: UploadVariant) -> Self {
        Self {
            surface,
            selectors: selectors::for_variant(variant),
        }
    }
}

#[async_trait]
impl UploadDriver for PortalUploadDriver {
    /// The full per-file sequence. Gates sit after mode selection,
    /// after the form renders, and before submission, so an abort is
    /// observable mid-file rather than only between files.
    async fn upload_one(
        &self,
        file: &Path,
        metadata: &BatchMetadata,
        control: &RunControl,
    ) -> Result<UploadOutcome, DriverError> {
        let s = self.selectors;

        // Navigate to the upload section and pick the variant's mode.
        self.surface.click_xpath(UPLOAD_SECTION_XPATH).await?;
        self.surface.frame_click_value(s.mode_button_value).await?;

        control.checkpoint().await?;

        // Attach the file and trigger metadata extraction. The portal
        // may grind on a large tile set for a very long time; the wait
        // below has no deadline on purpose.
        self.surface.frame_set_files(file).await?;
        self.surface.frame_click_text(s.register_label, false).await?;
        self.surface.frame_wait_for_xpath(s.form_ready_xpath).await?;

        control.checkpoint().await?;

        // A blank derived address means the portal could not locate
        // the data; skip without submitting.
        let alamat = self.surface.frame_input_value(s.alamat_xpath).await?;
        if alamat.trim().is_empty() {
            return Ok(UploadOutcome::Skipped(SKIP_REASON_EMPTY_ALAMAT.to_string()));
        }

        self.surface
            .frame_fill(s.resolution_xpath, &metadata.resolution)
            .await?;
        self.surface
            .frame_fill(s.accuracy_xpath, &metadata.accuracy)
            .await?;
        self.surface
            .frame_fill(s.survey_year_xpath, &metadata.survey_year)
            .await?;
        self.surface
            .frame_select_index(s.data_source_xpath, metadata.data_source_index)
            .await?;
        self.surface
            .frame_fill(s.phone_xpath, &metadata.phone_number)
            .await?;

        control.checkpoint().await?;

        // Save the registration, then confirm the upload.
        self.surface.frame_click_xpath(s.save_xpath).await?;
        self.surface
            .frame_click_text(s.upload_label, true)
            .await?;

        Ok(UploadOutcome::Completed)
    }
}
