// private sub-module defined in other files
mod array2d;
mod bounding_box;
mod point2d;
mod point3d;
mod polyline;

// exports identifiers from private sub-modules in the current module namespace
pub use self::array2d::Array2D;
pub use self::bounding_box::BoundingBox;
pub use self::point2d::Direction;
pub use self::point2d::Point2D;
pub use self::point3d::Point3D;
pub use self::polyline::MultiPolyline;
pub use self::polyline::Polyline;
