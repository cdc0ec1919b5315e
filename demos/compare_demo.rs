use twinframe::{CompareEngine, Direction, Size, SourceImage, Surface, TransitionKind};

fn gradient(width: u32, height: u32, seed: u32) -> anyhow::Result<SourceImage> {
    let mut px = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            px.extend_from_slice(&[(x * 3 + seed) as u8, (y * 2 + seed) as u8, seed as u8, 255]);
        }
    }
    Ok(SourceImage::from_premul_rgba8(width, height, px)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let before = gradient(192, 108, 16)?;
    let after = gradient(192, 108, 160)?;

    let reveal = Surface::new(Size::new(96.0, 54.0), 1.0)?;
    let cover = Surface::new(Size::new(96.0, 54.0), 1.0)?;
    let mut engine = CompareEngine::new(reveal, cover, before.clone())?;
    engine.apply_filter("sepia(1) brightness(110%)");

    for kind in [
        TransitionKind::Slide,
        TransitionKind::Blinds,
        TransitionKind::Dissolve,
        TransitionKind::Wipe,
        TransitionKind::Wave,
    ] {
        for frame in [0u32, 10, 20, 30] {
            let progress = f64::from(frame) / 30.0;
            engine.render_transition(kind, &before, &after, progress, Direction::Next);
        }
        println!("{kind:?}: center cover pixel {:?}", engine.cover().pixel(48, 27));
    }

    engine.update_image(after);
    println!("at rest with filter {:?}", engine.current_filter());
    Ok(())
}
