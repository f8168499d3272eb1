//! Render a stored thumbnail as a small grid of colored half-block
//! characters, the way terminal image previewers typically do it: each
//! printed character cell packs two source pixel rows into one terminal
//! row via foreground/background color.

use moment_finder::{Error, Thumbnail};

const RENDER_WIDTH: u32 = 32;

pub fn render(thumbnail: &Thumbnail) -> Result<String, Error> {
    let img = thumbnail.load_image()?.to_rgb8();
    let (width, height) = img.dimensions();

    let render_rows = ((RENDER_WIDTH as f64 / width as f64 * height as f64) / 2.0)
        .round()
        .max(1.0) as u32;
    let small = image::imageops::resize(
        &img,
        RENDER_WIDTH,
        render_rows * 2,
        image::imageops::FilterType::Triangle,
    );

    let mut out = String::new();
    for y in (0..small.height()).step_by(2) {
        for x in 0..small.width() {
            let top = small.get_pixel(x, y);
            let bottom = if y + 1 < small.height() {
                small.get_pixel(x, y + 1)
            } else {
                top
            };
            out.push_str(&format!(
                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m\u{2584}",
                top[0], top[1], top[2], bottom[0], bottom[1], bottom[2]
            ));
        }
        out.push_str("\x1b[0m\n");
    }

    Ok(out)
}
