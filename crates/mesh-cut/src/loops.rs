//! Ordered polygon-loop model with lifecycle events.
//!
//! One owner tracks every user-placed point loop (which loop is open,
//! which are closed), and interested consumers (line rendering, area
//! shading, measurement) subscribe to lifecycle events instead of polling
//! each other's internals. A loop closes when a point lands back on its
//! first point, or on an explicit [`LoopModel::close_current`] call.
//!
//! Measurement is a read-only consumer: closed loops expose perimeter and
//! enclosed area via [`crate::measure`].

use nalgebra::Point3;
use tracing::debug;

use crate::measure::{loop_area, loop_perimeter};

/// Lifecycle notification emitted by [`LoopModel`].
#[derive(Debug, Clone)]
pub enum LoopEvent {
    /// A new loop began.
    LoopStarted { loop_index: usize },
    /// A point was appended to the open loop.
    PointAdded {
        loop_index: usize,
        point_index: usize,
        point: Point3<f64>,
    },
    /// The open loop closed into a polygon.
    LoopClosed { loop_index: usize },
}

/// Observer callback for loop lifecycle events.
pub type LoopObserver = Box<dyn FnMut(&LoopEvent)>;

/// What [`LoopModel::add_point`] did with the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The point started a new loop.
    Started,
    /// The point extended the open loop.
    Added,
    /// The point landed on the loop's first point and closed it.
    Closed,
}

/// An ordered sequence of points, open while being placed and closed once
/// it forms a polygon.
#[derive(Debug, Clone)]
pub struct PolygonLoop {
    points: Vec<Point3<f64>>,
    closed: bool,
}

impl PolygonLoop {
    /// The loop's points in placement order.
    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Whether the loop has been closed into a polygon.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Total edge length; includes the closing edge only for closed loops.
    pub fn perimeter(&self) -> f64 {
        loop_perimeter(&self.points, self.closed)
    }

    /// Enclosed area; zero while the loop is open.
    pub fn area(&self) -> f64 {
        if self.closed {
            loop_area(&self.points)
        } else {
            0.0
        }
    }
}

/// Owner of all point loops, current and completed.
pub struct LoopModel {
    loops: Vec<PolygonLoop>,
    current: Option<usize>,
    close_threshold: f64,
    observers: Vec<LoopObserver>,
}

impl LoopModel {
    /// Create a model; points placed within `close_threshold` of an open
    /// loop's first point close that loop.
    pub fn new(close_threshold: f64) -> Self {
        Self {
            loops: Vec::new(),
            current: None,
            close_threshold,
            observers: Vec::new(),
        }
    }

    /// Register an observer for loop lifecycle events.
    pub fn subscribe(&mut self, observer: LoopObserver) {
        self.observers.push(observer);
    }

    /// All loops, open and closed, in creation order.
    #[inline]
    pub fn loops(&self) -> &[PolygonLoop] {
        &self.loops
    }

    /// The loop currently being placed, if any.
    pub fn current(&self) -> Option<&PolygonLoop> {
        self.current.map(|i| &self.loops[i])
    }

    /// Iterate over completed loops.
    pub fn closed_loops(&self) -> impl Iterator<Item = &PolygonLoop> {
        self.loops.iter().filter(|l| l.closed)
    }

    /// Begin a new empty loop, leaving any open loop as it was.
    pub fn start_loop(&mut self) -> usize {
        let loop_index = self.loops.len();
        self.loops.push(PolygonLoop {
            points: Vec::new(),
            closed: false,
        });
        self.current = Some(loop_index);
        self.emit(&LoopEvent::LoopStarted { loop_index });
        loop_index
    }

    /// Place a point.
    ///
    /// Starts a loop implicitly when none is open. A point landing within
    /// the close threshold of the open loop's first point closes the loop
    /// (the duplicate point is not stored).
    pub fn add_point(&mut self, point: Point3<f64>) -> AddOutcome {
        let started = self.current.is_none();
        if started {
            self.start_loop();
        }
        let loop_index = self.current.expect("a loop is open");

        let closes = {
            let open = &self.loops[loop_index];
            open.points.len() >= 3
                && (point - open.points[0]).norm() <= self.close_threshold
        };
        if closes {
            self.close(loop_index);
            return AddOutcome::Closed;
        }

        let point_index = self.loops[loop_index].points.len();
        self.loops[loop_index].points.push(point);
        self.emit(&LoopEvent::PointAdded {
            loop_index,
            point_index,
            point,
        });

        if started {
            AddOutcome::Started
        } else {
            AddOutcome::Added
        }
    }

    /// Close the open loop explicitly.
    ///
    /// Returns false when no loop is open or it has fewer than 3 points.
    pub fn close_current(&mut self) -> bool {
        match self.current {
            Some(loop_index) if self.loops[loop_index].points.len() >= 3 => {
                self.close(loop_index);
                true
            }
            _ => false,
        }
    }

    fn close(&mut self, loop_index: usize) {
        self.loops[loop_index].closed = true;
        self.current = None;
        debug!(
            loop_index,
            points = self.loops[loop_index].points.len(),
            "Loop closed"
        );
        self.emit(&LoopEvent::LoopClosed { loop_index });
    }

    fn emit(&mut self, event: &LoopEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn square_corners() -> [Point3<f64>; 4] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn first_point_starts_a_loop_implicitly() {
        let mut model = LoopModel::new(0.01);
        assert_eq!(model.add_point(Point3::origin()), AddOutcome::Started);
        assert_eq!(model.loops().len(), 1);
        assert!(model.current().is_some());
    }

    #[test]
    fn revisiting_the_first_point_closes_the_loop() {
        let mut model = LoopModel::new(0.01);
        for corner in square_corners() {
            model.add_point(corner);
        }
        // Land back near the first corner.
        let outcome = model.add_point(Point3::new(0.001, 0.0, 0.002));
        assert_eq!(outcome, AddOutcome::Closed);

        let closed: Vec<_> = model.closed_loops().collect();
        assert_eq!(closed.len(), 1);
        // The closing click is not stored as a fifth point.
        assert_eq!(closed[0].points().len(), 4);
        assert!(model.current().is_none());
    }

    #[test]
    fn closed_square_measures_unit_area_and_perimeter_four() {
        let mut model = LoopModel::new(0.01);
        for corner in square_corners() {
            model.add_point(corner);
        }
        assert!(model.close_current());
        let polygon = model.closed_loops().next().unwrap();
        assert!((polygon.perimeter() - 4.0).abs() < 1e-12);
        assert!((polygon.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn open_loops_have_no_area() {
        let mut model = LoopModel::new(0.01);
        model.add_point(Point3::new(0.0, 0.0, 0.0));
        model.add_point(Point3::new(1.0, 0.0, 0.0));
        let open = model.current().unwrap();
        assert_eq!(open.area(), 0.0);
        assert!((open.perimeter() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn close_requires_three_points() {
        let mut model = LoopModel::new(0.01);
        assert!(!model.close_current());
        model.add_point(Point3::new(0.0, 0.0, 0.0));
        model.add_point(Point3::new(1.0, 0.0, 0.0));
        assert!(!model.close_current());
        model.add_point(Point3::new(1.0, 0.0, 1.0));
        assert!(model.close_current());
    }

    #[test]
    fn observers_see_the_full_lifecycle() {
        let events: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = events.clone();

        let mut model = LoopModel::new(0.01);
        model.subscribe(Box::new(move |event| {
            let tag = match event {
                LoopEvent::LoopStarted { .. } => "started",
                LoopEvent::PointAdded { .. } => "added",
                LoopEvent::LoopClosed { .. } => "closed",
            };
            sink.borrow_mut().push(tag.to_string());
        }));

        for corner in square_corners() {
            model.add_point(corner);
        }
        model.add_point(Point3::new(0.0, 0.0, 0.0));

        assert_eq!(
            events.borrow().as_slice(),
            ["started", "added", "added", "added", "added", "closed"]
        );
    }

    #[test]
    fn a_new_loop_can_begin_after_one_closes() {
        let mut model = LoopModel::new(0.01);
        for corner in square_corners() {
            model.add_point(corner);
        }
        model.close_current();

        assert_eq!(model.add_point(Point3::new(5.0, 0.0, 5.0)), AddOutcome::Started);
        assert_eq!(model.loops().len(), 2);
        assert_eq!(model.closed_loops().count(), 1);
    }
}
