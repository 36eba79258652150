//! Selector and label tables for the portal's two upload flows.
//!
//! The portal renders both flows in the same iframe form (`#f15`);
//! only the mode button and the register-action label differ. XPaths
//! were recorded against the live portal and are deliberately kept as
//! data so a markup change is a table edit, not a code change.

use tilebot_core::UploadVariant;

/// Sidebar entry that opens the upload section.
pub const UPLOAD_SECTION_XPATH: &str = "/html/body/div[1]/aside/div/nav/ul/li[4]/a";

/// Sidebar entry that starts the portal login flow.
pub const LOGIN_MENU_XPATH: &str = "/html/body/div[1]/aside/div/nav/ul/li[5]/a";

/// Sidebar entry that only renders once the user is logged in.
pub const LOGIN_MARKER_XPATH: &str = "/html/body/div[1]/aside/div/nav/ul/li[8]";

/// Skip reason recorded when the derived address field is blank.
pub const SKIP_REASON_EMPTY_ALAMAT: &str = "Empty alamat";

/// Everything variant-specific about the upload sequence.
#[derive(Debug, Clone, Copy)]
pub struct VariantSelectors {
    /// `value` attribute of the mode radio button.
    pub mode_button_value: &'static str,
    /// Label of the metadata-registration action (substring match).
    pub register_label: &'static str,
    /// Input that renders once metadata extraction finished.
    pub form_ready_xpath: &'static str,
    /// Derived address field; blank means skip.
    pub alamat_xpath: &'static str,
    pub resolution_xpath: &'static str,
    pub accuracy_xpath: &'static str,
    pub survey_year_xpath: &'static str,
    /// Data-source dropdown.
    pub data_source_xpath: &'static str,
    pub phone_xpath: &'static str,
    /// Save/link action ahead of the final confirmation.
    pub save_xpath: &'static str,
    /// Final upload confirmation label (exact match).
    pub upload_label: &'static str,
}

const FORM_READY_XPATH: &str = "//*[@id=\"f15\"]/div[4]/input";
const ALAMAT_XPATH: &str = "//*[@id=\"f15\"]/div[2]/input";
const RESOLUTION_XPATH: &str = "//*[@id=\"f15\"]/div[4]/input";
const ACCURACY_XPATH: &str = "//*[@id=\"f15\"]/div[5]/input";
const SURVEY_YEAR_XPATH: &str = "//*[@id=\"f15\"]/div[6]/input";
const DATA_SOURCE_XPATH: &str = "//*[@id=\"f15\"]/div[7]/select";
const PHONE_XPATH: &str = "//*[@id=\"f15\"]/div[8]/input";
const SAVE_XPATH: &str = "//*[@id=\"mslink2\"]";
const UPLOAD_LABEL: &str = "upload";

/// MBTiles drone-photo upload flow.
pub const MBTILES: VariantSelectors = VariantSelectors {
    mode_button_value: "Mbtiles Peta Foto Drones",
    register_label: "Registrasi Metadata",
    form_ready_xpath: FORM_READY_XPATH,
    alamat_xpath: ALAMAT_XPATH,
    resolution_xpath: RESOLUTION_XPATH,
    accuracy_xpath: ACCURACY_XPATH,
    survey_year_xpath: SURVEY_YEAR_XPATH,
    data_source_xpath: DATA_SOURCE_XPATH,
    phone_xpath: PHONE_XPATH,
    save_xpath: SAVE_XPATH,
    upload_label: UPLOAD_LABEL,
};

/// XYZ DTM upload flow.
pub const XYZ: VariantSelectors = VariantSelectors {
    mode_button_value: "XYZ DTM",
    register_label: "Registrasi XYZ",
    form_ready_xpath: FORM_READY_XPATH,
    alamat_xpath: ALAMAT_XPATH,
    resolution_xpath: RESOLUTION_XPATH,
    accuracy_xpath: ACCURACY_XPATH,
    survey_year_xpath: SURVEY_YEAR_XPATH,
    data_source_xpath: DATA_SOURCE_XPATH,
    phone_xpath: PHONE_XPATH,
    save_xpath: SAVE_XPATH,
    upload_label: UPLOAD_LABEL,
};

/// Selector table for a variant.
pub fn for_variant(variant: UploadVariant) -> &'static VariantSelectors {
    match variant {
        UploadVariant::Mbtiles => &MBTILES,
        UploadVariant::Xyz => &XYZ,
    }
}
