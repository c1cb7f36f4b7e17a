//! Local illumination.

use solidray_math::{Point3, Vec3};
use solidray_shape::Rgb;

use crate::Light;

/// Color of a surface point seen from `eye`.
///
/// Ambient plus Lambert diffuse plus Blinn specular for every light. The
/// normal is flipped to face the eye first, so sheets and back faces light
/// like front faces. No shadows.
pub fn shade(surface: Rgb, eye: &Point3, light: &Light, point: &Point3, normal: &Vec3) -> Rgb {
    let f = &light.finish;
    let Some(view) = (eye - point).try_normalize(0.0) else {
        return surface.scale(f.ambient).clamped();
    };
    let n = if normal.dot(&view) < 0.0 { -normal } else { *normal };

    let mut diffuse = 0.0;
    let mut specular = 0.0;
    for source in &light.sources {
        let Some(to_light) = (source - point).try_normalize(0.0) else {
            continue;
        };
        let lambert = n.dot(&to_light);
        if lambert <= 0.0 {
            continue;
        }
        diffuse += lambert;
        if let Some(half) = (to_light + view).try_normalize(0.0) {
            specular += n.dot(&half).max(0.0).powf(f.shininess);
        }
    }

    surface
        .scale(f.ambient + f.diffuse * diffuse)
        .add(Rgb::WHITE.scale(f.specular * specular))
        .clamped()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn light_at(p: Point3) -> Light {
        Light::single(p)
    }

    #[test]
    fn test_head_on() {
        let eye = Point3::new(0.0, 0.0, 10.0);
        let c = shade(
            Rgb::new(1.0, 0.0, 0.0),
            &eye,
            &light_at(eye),
            &Point3::origin(),
            &Vec3::z(),
        );
        // 0.2 + 0.7 saturates red; the highlight is white.
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.g, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_back_face_lit_like_front() {
        let eye = Point3::new(0.0, 0.0, 10.0);
        let l = light_at(Point3::new(3.0, 0.0, 10.0));
        let s = Rgb::new(0.5, 0.5, 0.5);
        let front = shade(s, &eye, &l, &Point3::origin(), &Vec3::z());
        let back = shade(s, &eye, &l, &Point3::origin(), &-Vec3::z());
        assert_eq!(front, back);
    }

    #[test]
    fn test_light_behind_surface() {
        let eye = Point3::new(0.0, 0.0, 10.0);
        let l = light_at(Point3::new(0.0, 0.0, -10.0));
        let s = Rgb::new(0.5, 1.0, 0.5);
        let c = shade(s, &eye, &l, &Point3::origin(), &Vec3::z());
        assert_relative_eq!(c.g, 0.2, epsilon = 1e-12);
        assert_relative_eq!(c.r, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_no_lights_is_ambient() {
        let c = shade(
            Rgb::WHITE,
            &Point3::new(1.0, 0.0, 0.0),
            &Light::new(Vec::new()),
            &Point3::origin(),
            &Vec3::x(),
        );
        assert_eq!(c, Rgb::new(0.2, 0.2, 0.2));
    }
}
