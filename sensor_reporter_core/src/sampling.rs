/// Truncating mean of a batch of ADC conversions. `None` for an empty batch.
pub fn average(samples: &[u16]) -> Option<u16> {
    if samples.is_empty() {
        return None;
    }
    let sum: u32 = samples.iter().map(|sample| *sample as u32).sum();
    Some((sum / samples.len() as u32) as u16)
}
