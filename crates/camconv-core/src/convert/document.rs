use super::BatchResult;

/// Render the successful records of `batch` as a complete target document.
///
/// The `#` header is skipped by every grammar, so a rendered document can be
/// fed back in as input. Line formats hold one record per line; OSCam blocks
/// are separated by a blank line.
///
/// # Examples
/// ```
/// use camconv_core::{Protocol, convert_batch, render_document};
///
/// let text = "N: h 15000 u p 0102030405060708091011121314\n";
/// let batch = convert_batch(text, Protocol::Newcamd, Protocol::Cccam);
/// assert_eq!(
///     render_document(&batch, None),
///     "# CCcam configuration\n# Total records: 1\n\nC: h 15000 u p\n"
/// );
/// ```
pub fn render_document(batch: &BatchResult, generated_at: Option<&str>) -> String {
    let mut out = format!("# {} configuration\n", batch.target.display_name());
    if let Some(generated_at) = generated_at {
        out.push_str(&format!("# Generated: {generated_at}\n"));
    }
    out.push_str(&format!("# Total records: {}\n", batch.succeeded));

    let separator = if batch.target.is_line_format() {
        "\n"
    } else {
        "\n\n"
    };
    let body = batch
        .conversions()
        .map(|conversion| conversion.text.as_str())
        .collect::<Vec<_>>()
        .join(separator);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }
    out
}
