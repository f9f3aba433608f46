//! Drag-and-drop gesture state machine and drop classification.
//!
//! The render layer registers the droppable rects it laid out each frame and
//! feeds raw pointer events in; the controller answers with a [`MoveIntent`]
//! when a gesture completes. It knows geometry only — tree semantics stay in
//! the session layer.

// --- geometry ---

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// --- drop surface registry ---

/// The three kinds of drop surface a row exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    /// The task row itself: reorder as a sibling of that task.
    Task(u32),
    /// The indented children region under a task: re-parent into it.
    TaskChildren(u32),
    /// Empty sub-group body: drop to root level.
    SubGroup(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Droppable {
    pub zone: DropZone,
    pub rect: Rect,
}

// --- gesture model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// A mouse drag activates after this much travel, so plain clicks never
/// start a drag.
pub const MOUSE_ACTIVATION_DISTANCE: f32 = 5.0;
/// A touch drag activates after holding this long...
pub const TOUCH_ACTIVATION_DELAY_MS: u64 = 250;
/// ...provided the finger stayed within this tolerance meanwhile.
pub const TOUCH_TOLERANCE: f32 = 5.0;

/// Where the dragged task should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// Next to an existing task at the same level.
    Sibling { of: u32, after: bool },
    /// Last child of an existing task.
    Child { of: u32 },
    /// Root level of a sub-group.
    Root { sub_group: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveIntent {
    pub task_id: u32,
    pub target: MoveTarget,
}

#[derive(Debug, Clone, Copy)]
enum DragState {
    Idle,
    /// Pointer is down but the activation constraint is not yet met.
    Pending {
        task_id: u32,
        kind: PointerKind,
        origin: Point,
        down_ms: u64,
    },
    Dragging {
        task_id: u32,
        origin: Point,
        current: Point,
    },
}

#[derive(Default)]
pub struct DragController {
    state: DragState,
    droppables: Vec<Droppable>,
}

impl Default for DragState {
    fn default() -> DragState {
        DragState::Idle
    }
}

impl DragController {
    pub fn new() -> DragController {
        DragController::default()
    }

    /// Replace the drop surfaces for the current layout. Called every frame
    /// by the render layer; rects from a stale layout must not linger.
    pub fn set_droppables(&mut self, droppables: Vec<Droppable>) {
        self.droppables = droppables;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The task under drag, for render feedback.
    pub fn dragging_task(&self) -> Option<u32> {
        match self.state {
            DragState::Dragging { task_id, .. } => Some(task_id),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn on_pointer_down(&mut self, task_id: u32, kind: PointerKind, pos: Point, now_ms: u64) {
        self.state = DragState::Pending {
            task_id,
            kind,
            origin: pos,
            down_ms: now_ms,
        };
    }

    pub fn on_pointer_move(&mut self, pos: Point, now_ms: u64) {
        match self.state {
            DragState::Idle => {}
            DragState::Pending {
                task_id,
                kind,
                origin,
                down_ms,
            } => match kind {
                PointerKind::Mouse => {
                    if origin.distance(pos) >= MOUSE_ACTIVATION_DISTANCE {
                        self.state = DragState::Dragging {
                            task_id,
                            origin,
                            current: pos,
                        };
                    }
                }
                PointerKind::Touch => {
                    if now_ms.saturating_sub(down_ms) >= TOUCH_ACTIVATION_DELAY_MS {
                        self.state = DragState::Dragging {
                            task_id,
                            origin,
                            current: pos,
                        };
                    } else if origin.distance(pos) > TOUCH_TOLERANCE {
                        // Moved too early: this is a scroll, not a drag.
                        self.state = DragState::Idle;
                    }
                }
            },
            DragState::Dragging { ref mut current, .. } => *current = pos,
        }
    }

    /// Finish the gesture. Returns the resolved intent for a completed drag;
    /// a tap, an unclassifiable drop, or a self-drop yields `None` and the
    /// gesture is discarded.
    pub fn on_pointer_up(&mut self, pos: Point, _now_ms: u64) -> Option<MoveIntent> {
        let state = std::mem::take(&mut self.state);
        let DragState::Dragging {
            task_id, origin, ..
        } = state
        else {
            return None;
        };
        let zone = self.hit_test(pos)?;
        let target = match zone {
            DropZone::Task(target_id) => {
                if target_id == task_id {
                    return None;
                }
                // Dragging downward lands after the target, upward before it.
                MoveTarget::Sibling {
                    of: target_id,
                    after: pos.y > origin.y,
                }
            }
            DropZone::TaskChildren(target_id) => {
                if target_id == task_id {
                    return None;
                }
                MoveTarget::Child { of: target_id }
            }
            DropZone::SubGroup(sub_group) => MoveTarget::Root { sub_group },
        };
        Some(MoveIntent { task_id, target })
    }

    /// Exact containment wins; otherwise the nearest rect center, so drops
    /// just past a row edge still land somewhere sensible.
    fn hit_test(&self, pos: Point) -> Option<DropZone> {
        if let Some(hit) = self.droppables.iter().find(|d| d.rect.contains(pos)) {
            return Some(hit.zone);
        }
        self.droppables
            .iter()
            .min_by(|a, b| {
                let da = pos.distance(a.rect.center());
                let db = pos.distance(b.rect.center());
                da.total_cmp(&db)
            })
            .map(|d| d.zone)
    }
}
