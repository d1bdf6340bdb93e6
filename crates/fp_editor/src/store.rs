use std::sync::atomic::{AtomicBool, Ordering};

use fp_codec::{ExportFormat, ExportedFile};
use fp_core::Vec2;
use fp_models::{
    BackgroundImage, Beacon, EntityKind, MappingDocument, MappingEntity, Marker, MarkerKind,
    Measurement, NavPath, Polygon, Venue,
};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    background::{load_background, BackgroundFile},
    error::{EditorError, UserInputError},
    tool::{Tool, ToolbarAction},
    upload::UploadQueue,
};

/// Clicks farther than this from every entity hit nothing.
pub const PICK_RADIUS: f32 = 12.0;
/// Offset applied to a copied entity so it does not hide the original.
pub const COPY_OFFSET: f32 = 10.0;

pub const DEFAULT_LOCATION: &str = "campus";
pub const DEFAULT_FLOOR: &str = "ozzene campus";

/// What a canvas click did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Nothing,
    Placed(Uuid),
    PointAdded { count: usize },
    MeasureStarted,
    Selected(Uuid),
    Deleted(Uuid),
    Copied { source: Uuid, copy: Uuid },
}

/// All state behind the toolbar and the canvas.
///
/// Every change goes through [`NavigationStore::dispatch`] or
/// [`NavigationStore::click`], so the transitions live in one place.
#[derive(Debug)]
pub struct NavigationStore {
    current_tool: Option<Tool>,
    show_grid: bool,
    current_polygon: Vec<Vec2>,
    current_path: Vec<Vec2>,
    measure_start: Option<Vec2>,
    selection: Option<Uuid>,
    entities: Vec<MappingEntity>,
    background: Option<BackgroundImage>,
    selected_location: String,
    selected_floor: String,
    qr_dialog_open: bool,
    is_exporting: AtomicBool,
}

impl Default for NavigationStore {
    fn default() -> Self {
        Self {
            current_tool: None,
            show_grid: false,
            current_polygon: Vec::new(),
            current_path: Vec::new(),
            measure_start: None,
            selection: None,
            entities: Vec::new(),
            background: None,
            selected_location: DEFAULT_LOCATION.to_string(),
            selected_floor: DEFAULT_FLOOR.to_string(),
            qr_dialog_open: false,
            is_exporting: AtomicBool::new(false),
        }
    }
}

impl NavigationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a previously exported document, for instance one read back
    /// from a file.
    pub fn from_document(document: MappingDocument) -> Self {
        Self {
            background: document.background,
            entities: document.entities,
            ..Self::default()
        }
    }

    pub fn current_tool(&self) -> Option<Tool> {
        self.current_tool
    }
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }
    pub fn current_polygon(&self) -> &[Vec2] {
        &self.current_polygon
    }
    pub fn current_path(&self) -> &[Vec2] {
        &self.current_path
    }
    pub fn measure_start(&self) -> Option<Vec2> {
        self.measure_start
    }
    pub fn selection(&self) -> Option<Uuid> {
        self.selection
    }
    pub fn entities(&self) -> &[MappingEntity] {
        &self.entities
    }
    pub fn background(&self) -> Option<&BackgroundImage> {
        self.background.as_ref()
    }
    pub fn selected_location(&self) -> &str {
        &self.selected_location
    }
    pub fn selected_floor(&self) -> &str {
        &self.selected_floor
    }
    pub fn qr_dialog_open(&self) -> bool {
        self.qr_dialog_open
    }
    pub fn is_exporting(&self) -> bool {
        self.is_exporting.load(Ordering::SeqCst)
    }

    pub fn has_mapping_data(&self) -> bool {
        !self.entities.is_empty()
    }

    /// Snapshot of the exportable state.
    pub fn document(&self) -> MappingDocument {
        MappingDocument {
            background: self.background.clone(),
            ..MappingDocument::new(self.entities.clone())
        }
    }

    pub fn dispatch(&mut self, action: ToolbarAction) -> Result<(), EditorError> {
        debug!(?action, "toolbar action");
        match action {
            ToolbarAction::SelectTool(Tool::Grid) => {
                self.show_grid = !self.show_grid;
            }
            ToolbarAction::SelectTool(tool) => {
                let next = if self.current_tool == Some(tool) {
                    None
                } else {
                    Some(tool)
                };
                self.set_current_tool(next);
            }
            ToolbarAction::CompletePolygon => {
                self.complete_polygon()?;
            }
            ToolbarAction::FinishPath => {
                self.finish_path()?;
            }
            ToolbarAction::OpenQrDialog => self.qr_dialog_open = true,
            ToolbarAction::CloseQrDialog => self.qr_dialog_open = false,
            ToolbarAction::RemoveBackground => self.background = None,
            ToolbarAction::SelectLocation(name) => self.selected_location = name,
            ToolbarAction::SelectFloor(name) => self.selected_floor = name,
            ToolbarAction::ClearAll => {
                info!(entities = self.entities.len(), "clearing mapping");
                self.entities.clear();
                self.selection = None;
                self.abandon_drawing();
            }
        }
        Ok(())
    }

    /// Switching tools drops any half drawn shape.
    fn set_current_tool(&mut self, tool: Option<Tool>) {
        if tool != self.current_tool {
            self.abandon_drawing();
        }
        self.current_tool = tool;
    }

    fn abandon_drawing(&mut self) {
        if !self.current_polygon.is_empty() || !self.current_path.is_empty() {
            debug!(
                polygon = self.current_polygon.len(),
                path = self.current_path.len(),
                "dropping unfinished shape"
            );
        }
        self.current_polygon.clear();
        self.current_path.clear();
        self.measure_start = None;
    }

    pub fn can_complete_polygon(&self) -> bool {
        self.current_polygon.len() >= Polygon::MIN_POINTS
    }

    pub fn complete_polygon(&mut self) -> Result<Uuid, EditorError> {
        if !self.can_complete_polygon() {
            return Err(EditorError::IncompleteShape {
                kind: EntityKind::Polygon,
                min: Polygon::MIN_POINTS,
                found: self.current_polygon.len(),
            });
        }
        let id = Uuid::new_v4();
        let points = std::mem::take(&mut self.current_polygon);
        info!(%id, points = points.len(), "polygon completed");
        self.entities.push(MappingEntity::Polygon(Polygon {
            id,
            name: None,
            color: None,
            points,
        }));
        Ok(id)
    }

    pub fn finish_path(&mut self) -> Result<Uuid, EditorError> {
        if self.current_path.len() < NavPath::MIN_POINTS {
            return Err(EditorError::IncompleteShape {
                kind: EntityKind::Path,
                min: NavPath::MIN_POINTS,
                found: self.current_path.len(),
            });
        }
        let id = Uuid::new_v4();
        let points = std::mem::take(&mut self.current_path);
        info!(%id, points = points.len(), "path finished");
        self.entities.push(MappingEntity::Path(NavPath {
            id,
            name: None,
            points,
        }));
        Ok(id)
    }

    /// Applies the current tool at `at`, in canvas coordinates.
    ///
    /// Without a tool the click selects the nearest entity.
    pub fn click(&mut self, at: Vec2) -> Result<ClickOutcome, UserInputError> {
        if !at.is_finite() {
            return Err(UserInputError::NonFinitePosition);
        }
        let _span = info_span!("click", tool = ?self.current_tool).entered();
        let outcome = match self.current_tool {
            None | Some(Tool::Grid) => match self.pick(at) {
                Some(index) => {
                    let id = self.entities[index].id();
                    self.selection = Some(id);
                    ClickOutcome::Selected(id)
                }
                None => {
                    self.selection = None;
                    ClickOutcome::Nothing
                }
            },
            Some(Tool::Wifi) => {
                let name = self.next_name(EntityKind::Beacon, "beacon");
                self.place(|id| {
                    MappingEntity::Beacon(Beacon {
                        id,
                        position: at,
                        name,
                        ssid: None,
                        tx_power: None,
                    })
                })
            }
            Some(Tool::Location) => {
                let name = self.next_name(EntityKind::Venue, "venue");
                self.place(|id| {
                    MappingEntity::Venue(Venue {
                        id,
                        position: at,
                        name,
                        category: None,
                    })
                })
            }
            Some(Tool::Qr) => self.place_marker(MarkerKind::Qr, at),
            Some(Tool::Settings) => self.place_marker(MarkerKind::Settings, at),
            Some(Tool::Measure) => match self.measure_start.take() {
                None => {
                    self.measure_start = Some(at);
                    ClickOutcome::MeasureStarted
                }
                Some(start) => self.place(|id| {
                    MappingEntity::Measurement(Measurement {
                        id,
                        start,
                        end: at,
                        label: None,
                    })
                }),
            },
            Some(Tool::Polygon) => {
                self.current_polygon.push(at);
                ClickOutcome::PointAdded {
                    count: self.current_polygon.len(),
                }
            }
            Some(Tool::Path) => {
                self.current_path.push(at);
                ClickOutcome::PointAdded {
                    count: self.current_path.len(),
                }
            }
            Some(Tool::Delete) => match self.pick(at) {
                Some(index) => {
                    let removed = self.entities.remove(index);
                    if self.selection == Some(removed.id()) {
                        self.selection = None;
                    }
                    info!(id = %removed.id(), kind = %removed.kind(), "entity deleted");
                    ClickOutcome::Deleted(removed.id())
                }
                None => ClickOutcome::Nothing,
            },
            Some(Tool::Copy) => match self.pick(at) {
                Some(index) => {
                    let mut copy = self.entities[index].clone();
                    let source = copy.id();
                    let id = Uuid::new_v4();
                    copy.set_id(id);
                    copy.translate(COPY_OFFSET, COPY_OFFSET);
                    self.entities.push(copy);
                    self.selection = Some(id);
                    info!(%source, copy = %id, "entity copied");
                    ClickOutcome::Copied { source, copy: id }
                }
                None => ClickOutcome::Nothing,
            },
        };
        Ok(outcome)
    }

    fn place(&mut self, build: impl FnOnce(Uuid) -> MappingEntity) -> ClickOutcome {
        let id = Uuid::new_v4();
        let entity = build(id);
        info!(%id, kind = %entity.kind(), "entity placed");
        self.entities.push(entity);
        ClickOutcome::Placed(id)
    }

    fn place_marker(&mut self, kind: MarkerKind, at: Vec2) -> ClickOutcome {
        self.place(|id| {
            MappingEntity::Marker(Marker {
                id,
                kind,
                position: at,
                label: None,
            })
        })
    }

    fn next_name(&self, kind: EntityKind, prefix: &str) -> String {
        let count = self.entities.iter().filter(|e| e.kind() == kind).count();
        format!("{prefix}-{}", count + 1)
    }

    /// Index of the entity closest to `at`, within [`PICK_RADIUS`].
    fn pick(&self, at: Vec2) -> Option<usize> {
        self.entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (index, entity.distance_to(at)))
            .filter(|(_, distance)| *distance <= PICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Status line shown under the toolbar while a tool is active.
    pub fn status_hint(&self) -> Option<String> {
        let hint = match self.current_tool? {
            Tool::Wifi => "Click anywhere to place WiFi beacon".to_string(),
            Tool::Location => "Click anywhere to add venue".to_string(),
            Tool::Measure => "Click anywhere to measure distance".to_string(),
            Tool::Path => "Click anywhere to draw navigation path".to_string(),
            Tool::Polygon if self.current_polygon.is_empty() => {
                "Click anywhere to start drawing polygon".to_string()
            }
            Tool::Polygon => format!(
                "Click to add point ({} points) • Double-click or press Complete to finish",
                self.current_polygon.len()
            ),
            Tool::Qr => "Click anywhere to place QR code".to_string(),
            Tool::Settings => "Click anywhere to add settings marker".to_string(),
            Tool::Delete => "Click on an item to delete it".to_string(),
            Tool::Copy => "Click on an item to copy it".to_string(),
            Tool::Grid => return None,
        };
        Some(hint)
    }

    pub fn grid_hint(&self) -> Option<&'static str> {
        self.show_grid.then_some("Grid overlay is active")
    }

    pub fn set_background_image(&mut self, file: &BackgroundFile) -> Result<(), UserInputError> {
        let background = load_background(file)?;
        info!(name = %file.name, "background image set");
        self.background = Some(background);
        Ok(())
    }

    /// Serializes the current mapping.
    ///
    /// Refused when there is nothing to export or another export is running.
    /// `is_exporting` stays raised for the duration of the call.
    pub fn export(&self, format: ExportFormat) -> Result<ExportedFile, EditorError> {
        if !self.has_mapping_data() {
            warn!("export requested without mapping data");
            return Err(EditorError::NothingToExport);
        }
        if self
            .is_exporting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EditorError::ExportInProgress);
        }
        let _exporting = scopeguard::guard(&self.is_exporting, |flag| {
            flag.store(false, Ordering::SeqCst);
        });
        fp_codec::export(&self.document(), format).map_err(|e| {
            warn!(error = %e, %format, "failed to export mapping data");
            EditorError::from(e)
        })
    }

    /// Hands the current mapping to the upload worker under the selected
    /// location name.
    pub fn start_upload(&self, queue: &UploadQueue) -> Result<(), EditorError> {
        queue.enqueue(&self.selected_location, self.document())
    }
}
