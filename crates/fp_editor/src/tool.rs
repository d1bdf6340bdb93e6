use fp_codec::ExportFormat;

/// Tools of the editor toolbar. Names are the ones the toolbar uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Tool {
    Wifi,
    /// Toggles the grid overlay, never stays selected.
    Grid,
    Location,
    Measure,
    Path,
    Polygon,
    Qr,
    Settings,
    Copy,
    Delete,
}

impl Tool {
    /// Whether a canvas click with this tool places a new entity.
    pub fn places_entity(self) -> bool {
        matches!(
            self,
            Tool::Wifi | Tool::Location | Tool::Qr | Tool::Settings
        )
    }
}

/// Every event the toolbar can emit.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    /// Selecting the active tool again deselects it.
    SelectTool(Tool),
    CompletePolygon,
    FinishPath,
    OpenQrDialog,
    CloseQrDialog,
    RemoveBackground,
    SelectLocation(String),
    SelectFloor(String),
    ClearAll,
}

/// Export entries offered by the toolbar, in display order.
pub const EXPORT_FORMATS: [ExportFormat; 2] = [ExportFormat::Json, ExportFormat::Xml];
