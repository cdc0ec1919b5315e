use twinframe::{CompareEngine, Size, SourceImage, Surface, parse_filter};

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    SourceImage::from_premul_rgba8(width, height, rgba.repeat((width * height) as usize)).unwrap()
}

fn engine(width: f64, height: f64, image: SourceImage) -> CompareEngine {
    let reveal = Surface::new(Size::new(width, height), 1.0).unwrap();
    let cover = Surface::new(Size::new(width, height), 1.0).unwrap();
    CompareEngine::new(reveal, cover, image).unwrap()
}

#[test]
fn bake_writes_cover_and_leaves_reveal_unfiltered() {
    let mut e = engine(8.0, 8.0, solid(8, 8, [200, 40, 120, 255]));
    e.apply_filter("grayscale(100%)");

    let reveal = e.reveal().pixel(3, 3);
    let cover = e.cover().pixel(3, 3);
    assert_eq!(reveal, [200, 40, 120, 255]);
    assert_eq!(cover[0], cover[1]);
    assert_eq!(cover[1], cover[2]);
    assert_eq!(cover[3], 255);
}

#[test]
fn filter_none_twice_is_pixel_identical_to_once() {
    let mut e = engine(8.0, 8.0, solid(8, 8, [90, 60, 30, 255]));
    e.apply_filter("none");
    let once = e.cover().data().to_vec();
    e.apply_filter("none");
    assert_eq!(e.cover().data(), &once[..]);
    assert_eq!(e.cover().data(), e.reveal().data());
}

#[test]
fn switching_back_to_none_restores_the_unfiltered_look() {
    let mut e = engine(8.0, 8.0, solid(8, 8, [90, 60, 30, 255]));
    e.apply_filter("invert(1)");
    assert_ne!(e.cover().data(), e.reveal().data());
    e.apply_filter("none");
    assert_eq!(e.cover().data(), e.reveal().data());
    assert_eq!(e.current_filter(), "none");
}

#[test]
fn invalid_spec_keeps_previous_bake() {
    let mut e = engine(8.0, 8.0, solid(8, 8, [90, 60, 30, 255]));
    e.apply_filter("sepia(1)");
    let baked = e.cover().data().to_vec();

    e.apply_filter("definitely-not-a-filter(3)");
    assert_eq!(e.current_filter(), "sepia(1)");
    assert_eq!(e.cover().data(), &baked[..]);
}

#[test]
fn filter_survives_redraw() {
    let mut e = engine(8.0, 8.0, solid(8, 8, [255, 255, 255, 255]));
    e.apply_filter("invert(1)");
    e.redraw_sized(10.0, 10.0);
    assert_eq!(e.current_filter(), "invert(1)");
    // Re-baked onto the resized cover: white image, inverted to black.
    assert_eq!(e.cover().pixel(5, 5), [0, 0, 0, 255]);
    assert_eq!(e.reveal().pixel(5, 5), [255, 255, 255, 255]);
}

#[test]
fn blur_keeps_a_uniform_image_uniform() {
    let mut e = engine(8.0, 8.0, solid(8, 8, [50, 100, 150, 255]));
    e.apply_filter("blur(2px)");
    assert_eq!(e.cover().pixel(4, 4), [50, 100, 150, 255]);
}

#[test]
fn filter_chain_composes_in_order() {
    let mut e = engine(4.0, 4.0, solid(4, 4, [100, 100, 100, 255]));
    // brightness then invert is not invert then brightness.
    e.apply_filter("brightness(200%) invert(1)");
    let a = e.cover().pixel(1, 1);

    e.apply_filter("invert(1) brightness(200%)");
    let b = e.cover().pixel(1, 1);
    assert_ne!(a, b);
}

#[test]
fn preset_descriptors_from_host_config_parse() {
    for spec in [
        "brightness(50%)",
        "contrast(200%)",
        "contrast(300%) brightness(70%)",
        "sepia(100%)",
        "hue-rotate(90deg)",
        "saturate(300%)",
        "blur(8px)",
        "brightness(60%) contrast(150%)",
    ] {
        assert!(parse_filter(spec).is_ok(), "preset '{spec}' must parse");
    }
}
