//! The shape tree: primitives and boolean operators in one closed enum.

use serde::{Deserialize, Serialize};
use solidray_math::{Bbox, Half, Point2, Point3, Vec3};

use crate::operator::Logic;
use crate::primitive::{
    Bicylinder, Circle, Cone, Cuboid, Cylinder, Ellipsoid, Everything, HalfSpace, Nothing, Paraboloid, Pill,
    Polygon, Primitive, Silo, Sphere, Surf, Tabular, Torus, Triangle, Washer, XPlane, YPlane, ZPlane,
};
use crate::{Diagnostics, Prepared};

/// Invoke `$mac!` with the `Variant: Type` list of every primitive.
macro_rules! for_each_primitive {
    ($mac:ident) => {
        $mac! {
            Sphere: Sphere,
            Ellipsoid: Ellipsoid,
            Cuboid: Cuboid,
            Cylinder: Cylinder,
            Cone: Cone,
            Bicylinder: Bicylinder,
            Washer: Washer,
            Pill: Pill,
            Silo: Silo,
            Paraboloid: Paraboloid,
            Tabular: Tabular,
            Torus: Torus,
            Half: HalfSpace,
            Everything: Everything,
            Nothing: Nothing,
            Circle: Circle,
            Polygon: Polygon,
            Triangle: Triangle,
            Surf: Surf,
            XPlane: XPlane,
            YPlane: YPlane,
            ZPlane: ZPlane,
        }
    };
}
pub(crate) use for_each_primitive;

/// A node of the scene tree.
///
/// `base` is an optional color tag; `on = false` removes the node (it
/// behaves as [`Nothing`]) without editing the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape<C> {
    /// What this node is.
    #[serde(flatten)]
    pub kind: ShapeKind<C>,
    /// Color tag, inherited by untagged descendants via
    /// [`Shape::propagate_base`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<C>,
    /// Whether the node takes part in rendering.
    #[serde(default = "on")]
    pub on: bool,
}

fn on() -> bool {
    true
}

/// Every kind of shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind<C> {
    /// Ball.
    Sphere(Sphere),
    /// Rotated ellipsoid.
    Ellipsoid(Ellipsoid),
    /// Rotated box.
    #[serde(rename = "box")]
    Cuboid(Cuboid),
    /// Capped cylinder.
    Cylinder(Cylinder),
    /// Capped cone.
    Cone(Cone),
    /// Capped frustum.
    Bicylinder(Bicylinder),
    /// Cylinder with a coaxial hole.
    Washer(Washer),
    /// Capsule with two rounded ends.
    Pill(Pill),
    /// Capsule with one flat and one rounded end.
    Silo(Silo),
    /// Paraboloid with a flat base.
    Paraboloid(Paraboloid),
    /// Solid of revolution from a radius table.
    Tabular(Tabular),
    /// Torus.
    Torus(Torus),
    /// Solid half-space.
    Half(HalfSpace),
    /// All of space.
    Everything(Everything),
    /// Nothing at all.
    Nothing(Nothing),
    /// Disc sheet.
    Circle(Circle),
    /// Planar polygon sheet.
    Polygon(Polygon),
    /// Triangle sheet.
    Triangle(Triangle),
    /// Triangle mesh sheet.
    Surf(Surf),
    /// Plane sheet `x = value`.
    #[serde(rename = "xplane")]
    XPlane(XPlane),
    /// Plane sheet `y = value`.
    #[serde(rename = "yplane")]
    YPlane(YPlane),
    /// Plane sheet `z = value`.
    #[serde(rename = "zplane")]
    ZPlane(ZPlane),
    /// Complement.
    Not {
        /// Operand.
        shape: Box<Shape<C>>,
    },
    /// Intersection of two shapes.
    And {
        /// Operands.
        shapes: Box<[Shape<C>; 2]>,
    },
    /// Union of two shapes.
    Or {
        /// Operands.
        shapes: Box<[Shape<C>; 2]>,
    },
    /// Points in exactly one of two shapes.
    Xor {
        /// Operands.
        shapes: Box<[Shape<C>; 2]>,
    },
    /// First shape minus the second.
    Cut {
        /// Operands.
        shapes: Box<[Shape<C>; 2]>,
    },
    /// Intersection of all operands.
    Ands {
        /// Operands.
        shapes: Vec<Shape<C>>,
    },
    /// Union of all operands.
    Ors {
        /// Operands.
        shapes: Vec<Shape<C>>,
    },
    /// Points in exactly one operand.
    One {
        /// Operands.
        shapes: Vec<Shape<C>>,
    },
    /// Points in at least `k` operands.
    Some {
        /// Threshold.
        k: usize,
        /// Operands.
        shapes: Vec<Shape<C>>,
    },
    /// Points in an odd number of operands.
    Odd {
        /// Operands.
        shapes: Vec<Shape<C>>,
    },
    /// Points in an even number of operands (including none).
    Even {
        /// Operands.
        shapes: Vec<Shape<C>>,
    },
}

macro_rules! primitive_dispatch {
    ($($v:ident : $t:ty),* $(,)?) => {
        impl<C> ShapeKind<C> {
            fn primitive_aabb(&self) -> Option<Bbox> {
                match self {
                    $(ShapeKind::$v(p) => Some(p.aabb()),)*
                    _ => None,
                }
            }

            fn primitive_dry(&self, half: &Half) -> Option<bool> {
                match self {
                    $(ShapeKind::$v(p) => Some(p.degenerate() || p.dry(half)),)*
                    _ => None,
                }
            }

            fn primitive_check(&self, diag: &mut Diagnostics, ctx: &str) -> bool {
                match self {
                    $(ShapeKind::$v(p) => {
                        p.check(diag, ctx);
                        true
                    })*
                    _ => false,
                }
            }

            fn primitive_solid(&self) -> Option<bool> {
                match self {
                    $(ShapeKind::$v(_) => Some(<$t as Primitive>::SOLID),)*
                    _ => None,
                }
            }
        }
    };
}

for_each_primitive!(primitive_dispatch);

impl<C> ShapeKind<C> {
    /// The boolean rule and operands of an operator node; `None` for
    /// primitives.
    pub fn operands(&self) -> Option<(Logic, &[Shape<C>])> {
        Some(match self {
            ShapeKind::Not { shape } => (Logic::Not, std::slice::from_ref(&**shape)),
            ShapeKind::And { shapes } => (Logic::And, &shapes[..]),
            ShapeKind::Or { shapes } => (Logic::Or, &shapes[..]),
            ShapeKind::Xor { shapes } => (Logic::Xor, &shapes[..]),
            ShapeKind::Cut { shapes } => (Logic::Cut, &shapes[..]),
            ShapeKind::Ands { shapes } => (Logic::Ands, &shapes[..]),
            ShapeKind::Ors { shapes } => (Logic::Ors, &shapes[..]),
            ShapeKind::One { shapes } => (Logic::One, &shapes[..]),
            ShapeKind::Some { k, shapes } => (Logic::Some(*k), &shapes[..]),
            ShapeKind::Odd { shapes } => (Logic::Odd, &shapes[..]),
            ShapeKind::Even { shapes } => (Logic::Even, &shapes[..]),
            _ => return None,
        })
    }

    fn operands_mut(&mut self) -> &mut [Shape<C>] {
        match self {
            ShapeKind::Not { shape } => std::slice::from_mut(&mut **shape),
            ShapeKind::And { shapes }
            | ShapeKind::Or { shapes }
            | ShapeKind::Xor { shapes }
            | ShapeKind::Cut { shapes } => &mut shapes[..],
            ShapeKind::Ands { shapes }
            | ShapeKind::Ors { shapes }
            | ShapeKind::One { shapes }
            | ShapeKind::Some { shapes, .. }
            | ShapeKind::Odd { shapes }
            | ShapeKind::Even { shapes } => &mut shapes[..],
            _ => &mut [],
        }
    }

    /// Short lowercase name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere(_) => "sphere",
            ShapeKind::Ellipsoid(_) => "ellipsoid",
            ShapeKind::Cuboid(_) => "box",
            ShapeKind::Cylinder(_) => "cylinder",
            ShapeKind::Cone(_) => "cone",
            ShapeKind::Bicylinder(_) => "bicylinder",
            ShapeKind::Washer(_) => "washer",
            ShapeKind::Pill(_) => "pill",
            ShapeKind::Silo(_) => "silo",
            ShapeKind::Paraboloid(_) => "paraboloid",
            ShapeKind::Tabular(_) => "tabular",
            ShapeKind::Torus(_) => "torus",
            ShapeKind::Half(_) => "half",
            ShapeKind::Everything(_) => "everything",
            ShapeKind::Nothing(_) => "nothing",
            ShapeKind::Circle(_) => "circle",
            ShapeKind::Polygon(_) => "polygon",
            ShapeKind::Triangle(_) => "triangle",
            ShapeKind::Surf(_) => "surf",
            ShapeKind::XPlane(_) => "xplane",
            ShapeKind::YPlane(_) => "yplane",
            ShapeKind::ZPlane(_) => "zplane",
            ShapeKind::Not { .. } => "not",
            ShapeKind::And { .. } => "and",
            ShapeKind::Or { .. } => "or",
            ShapeKind::Xor { .. } => "xor",
            ShapeKind::Cut { .. } => "cut",
            ShapeKind::Ands { .. } => "ands",
            ShapeKind::Ors { .. } => "ors",
            ShapeKind::One { .. } => "one",
            ShapeKind::Some { .. } => "some",
            ShapeKind::Odd { .. } => "odd",
            ShapeKind::Even { .. } => "even",
        }
    }

    /// Small stable integer identifying the variant.
    pub fn id(&self) -> u32 {
        match self {
            ShapeKind::Sphere(_) => 1,
            ShapeKind::Ellipsoid(_) => 2,
            ShapeKind::Cuboid(_) => 3,
            ShapeKind::Cylinder(_) => 4,
            ShapeKind::Cone(_) => 5,
            ShapeKind::Bicylinder(_) => 6,
            ShapeKind::Washer(_) => 7,
            ShapeKind::Pill(_) => 8,
            ShapeKind::Silo(_) => 9,
            ShapeKind::Paraboloid(_) => 10,
            ShapeKind::Tabular(_) => 11,
            ShapeKind::Torus(_) => 12,
            ShapeKind::Half(_) => 13,
            ShapeKind::Everything(_) => 14,
            ShapeKind::Nothing(_) => 15,
            ShapeKind::Circle(_) => 20,
            ShapeKind::Polygon(_) => 21,
            ShapeKind::Triangle(_) => 22,
            ShapeKind::Surf(_) => 23,
            ShapeKind::XPlane(_) => 24,
            ShapeKind::YPlane(_) => 25,
            ShapeKind::ZPlane(_) => 26,
            ShapeKind::Not { .. } => 40,
            ShapeKind::And { .. } => 41,
            ShapeKind::Or { .. } => 42,
            ShapeKind::Xor { .. } => 43,
            ShapeKind::Cut { .. } => 44,
            ShapeKind::Ands { .. } => 45,
            ShapeKind::Ors { .. } => 46,
            ShapeKind::One { .. } => 47,
            ShapeKind::Some { .. } => 48,
            ShapeKind::Odd { .. } => 49,
            ShapeKind::Even { .. } => 50,
        }
    }
}

impl<C> From<ShapeKind<C>> for Shape<C> {
    fn from(kind: ShapeKind<C>) -> Self {
        Self {
            kind,
            base: None,
            on: true,
        }
    }
}

impl<C> Shape<C> {
    /// Untagged, enabled shape.
    pub fn new(kind: ShapeKind<C>) -> Self {
        kind.into()
    }

    /// Attach a color tag.
    pub fn with_base(mut self, base: C) -> Self {
        self.base = Some(base);
        self
    }

    /// Enable or disable the node.
    pub fn with_on(mut self, on: bool) -> Self {
        self.on = on;
        self
    }

    /// Short lowercase name of the variant.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Whether the shape bounds a volume. Operators always do; sheets
    /// do not.
    pub fn is_solid(&self) -> bool {
        self.kind.primitive_solid().unwrap_or(true)
    }

    /// Tagged axis-aligned bounds. A disabled node is empty.
    pub fn aabb(&self) -> Bbox {
        if !self.on {
            return Bbox::empty();
        }
        match self.kind.operands() {
            Some((logic, children)) => logic.aabb(children),
            None => self.kind.primitive_aabb().unwrap_or_else(Bbox::infinite),
        }
    }

    /// True only if no visible point of the shape lies in `half`.
    ///
    /// Sound but not exact: `false` never proves the shape reaches the
    /// region.
    pub fn dry(&self, half: &Half) -> bool {
        if !self.on {
            return true;
        }
        match self.kind.operands() {
            Some((logic, children)) => logic.dry(children, half),
            None => self.kind.primitive_dry(half).unwrap_or(false),
        }
    }

    /// Per-frame preparation for a fixed eye point.
    pub fn process(&self, eye: &Point3) -> Prepared<'_, C> {
        Prepared::new(self, eye)
    }

    /// Validate the whole tree.
    pub fn check(&self) -> Diagnostics {
        let mut diag = Diagnostics::default();
        self.check_into(&mut diag, self.name());
        diag
    }

    /// Validate the whole tree into an existing collector; `path` names
    /// this node in messages.
    pub fn check_into(&self, diag: &mut Diagnostics, path: &str) {
        if self.kind.primitive_check(diag, path) {
            return;
        }
        let Some((logic, children)) = self.kind.operands() else {
            return;
        };
        if children.is_empty() {
            diag.warning(path, format!("{} has no operands", self.name()));
        }
        if let Logic::Some(k) = logic {
            if k > children.len() {
                diag.warning(path, format!("some needs {k} of {} operands and is always empty", children.len()));
            }
        }
        for (i, child) in children.iter().enumerate() {
            child.check_into(diag, &format!("{path}.{i}/{}", child.name()));
        }
    }

    /// Push each operator's color tag down onto untagged descendants.
    pub fn propagate_base(&mut self)
    where
        C: Clone,
    {
        let base = self.base.clone();
        for child in self.kind.operands_mut() {
            if child.base.is_none() {
                child.base = base.clone();
            }
            child.propagate_base();
        }
    }

    /// Number of nodes in the tree.
    pub fn count(&self) -> usize {
        1 + self
            .kind
            .operands()
            .map(|(_, c)| c.iter().map(Shape::count).sum::<usize>())
            .unwrap_or(0)
    }
}

/// Constructors.
impl<C> Shape<C> {
    /// Ball.
    pub fn sphere(center: Point3, radius: f64) -> Self {
        ShapeKind::Sphere(Sphere::new(center, radius)).into()
    }

    /// Axis-aligned ellipsoid.
    pub fn ellipsoid(center: Point3, radii: Vec3) -> Self {
        ShapeKind::Ellipsoid(Ellipsoid::new(center, radii)).into()
    }

    /// Axis-aligned box from center and edge lengths.
    pub fn cuboid(center: Point3, size: Vec3) -> Self {
        ShapeKind::Cuboid(Cuboid::new(center, size)).into()
    }

    /// Rotated box; `angles` in degrees about x, then y, then z.
    pub fn rotated_cuboid(center: Point3, size: Vec3, angles: Vec3) -> Self {
        ShapeKind::Cuboid(Cuboid { center, size, angles }).into()
    }

    /// Cylinder.
    pub fn cylinder(a: Point3, b: Point3, radius: f64) -> Self {
        ShapeKind::Cylinder(Cylinder::new(a, b, radius)).into()
    }

    /// Cone.
    pub fn cone(base: Point3, apex: Point3, radius: f64) -> Self {
        ShapeKind::Cone(Cone::new(base, apex, radius)).into()
    }

    /// Frustum.
    pub fn bicylinder(a: Point3, b: Point3, ra: f64, rb: f64) -> Self {
        ShapeKind::Bicylinder(Bicylinder::new(a, b, ra, rb)).into()
    }

    /// Washer.
    pub fn washer(a: Point3, b: Point3, inner: f64, outer: f64) -> Self {
        ShapeKind::Washer(Washer::new(a, b, inner, outer)).into()
    }

    /// Capsule.
    pub fn pill(a: Point3, b: Point3, radius: f64) -> Self {
        ShapeKind::Pill(Pill::new(a, b, radius)).into()
    }

    /// Silo.
    pub fn silo(a: Point3, b: Point3, radius: f64) -> Self {
        ShapeKind::Silo(Silo::new(a, b, radius)).into()
    }

    /// Paraboloid.
    pub fn paraboloid(base: Point3, apex: Point3, radius: f64) -> Self {
        ShapeKind::Paraboloid(Paraboloid::new(base, apex, radius)).into()
    }

    /// Solid of revolution.
    pub fn tabular(a: Point3, b: Point3, profile: Vec<Point2>) -> Self {
        ShapeKind::Tabular(Tabular::new(a, b, profile)).into()
    }

    /// Torus.
    pub fn torus(center: Point3, axis: Point3, major: f64, minor: f64) -> Self {
        ShapeKind::Torus(Torus::new(center, axis, major, minor)).into()
    }

    /// Half-space with outward `normal`.
    pub fn half(point: Point3, normal: Vec3) -> Self {
        ShapeKind::Half(HalfSpace::new(point, normal)).into()
    }

    /// All of space.
    pub fn everything() -> Self {
        ShapeKind::Everything(Everything {}).into()
    }

    /// The empty shape.
    pub fn nothing() -> Self {
        ShapeKind::Nothing(Nothing {}).into()
    }

    /// Disc sheet.
    pub fn circle(center: Point3, normal: Vec3, radius: f64) -> Self {
        ShapeKind::Circle(Circle::new(center, normal, radius)).into()
    }

    /// Polygon sheet.
    pub fn polygon(points: Vec<Point3>) -> Self {
        ShapeKind::Polygon(Polygon::new(points)).into()
    }

    /// Triangle sheet.
    pub fn triangle(u: Point3, v: Point3, w: Point3) -> Self {
        ShapeKind::Triangle(Triangle::new(u, v, w)).into()
    }

    /// Mesh sheet.
    pub fn surf(nodes: Vec<Point3>, faces: Vec<[usize; 3]>) -> Self {
        ShapeKind::Surf(Surf::new(nodes, faces)).into()
    }

    /// Plane `x = value`.
    pub fn xplane(value: f64) -> Self {
        ShapeKind::XPlane(XPlane::new(value)).into()
    }

    /// Plane `y = value`.
    pub fn yplane(value: f64) -> Self {
        ShapeKind::YPlane(YPlane::new(value)).into()
    }

    /// Plane `z = value`.
    pub fn zplane(value: f64) -> Self {
        ShapeKind::ZPlane(ZPlane::new(value)).into()
    }

    /// Complement.
    pub fn not(shape: Shape<C>) -> Self {
        ShapeKind::Not { shape: Box::new(shape) }.into()
    }

    /// Intersection.
    pub fn and(a: Shape<C>, b: Shape<C>) -> Self {
        ShapeKind::And { shapes: Box::new([a, b]) }.into()
    }

    /// Union.
    pub fn or(a: Shape<C>, b: Shape<C>) -> Self {
        ShapeKind::Or { shapes: Box::new([a, b]) }.into()
    }

    /// Symmetric difference.
    pub fn xor(a: Shape<C>, b: Shape<C>) -> Self {
        ShapeKind::Xor { shapes: Box::new([a, b]) }.into()
    }

    /// Difference `a - b`.
    pub fn cut(a: Shape<C>, b: Shape<C>) -> Self {
        ShapeKind::Cut { shapes: Box::new([a, b]) }.into()
    }

    /// N-ary intersection.
    pub fn ands(shapes: Vec<Shape<C>>) -> Self {
        ShapeKind::Ands { shapes }.into()
    }

    /// N-ary union.
    pub fn ors(shapes: Vec<Shape<C>>) -> Self {
        ShapeKind::Ors { shapes }.into()
    }

    /// Exactly one operand.
    pub fn one(shapes: Vec<Shape<C>>) -> Self {
        ShapeKind::One { shapes }.into()
    }

    /// At least `k` operands.
    pub fn some(k: usize, shapes: Vec<Shape<C>>) -> Self {
        ShapeKind::Some { k, shapes }.into()
    }

    /// An odd number of operands.
    pub fn odd(shapes: Vec<Shape<C>>) -> Self {
        ShapeKind::Odd { shapes }.into()
    }

    /// An even number of operands.
    pub fn even(shapes: Vec<Shape<C>>) -> Self {
        ShapeKind::Even { shapes }.into()
    }
}
