use rayon::prelude::*;

const BINS: usize = 256;

/// 256-bin channel histograms of the committed image. `total` accumulates all
/// three color channels; `max` is the tallest `total` bin and scales the plot.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub r: Vec<u64>,
    pub g: Vec<u64>,
    pub b: Vec<u64>,
    pub total: Vec<u64>,
    pub max: u64,
}

impl Histogram {
    fn empty() -> Self {
        Self {
            r: vec![0; BINS],
            g: vec![0; BINS],
            b: vec![0; BINS],
            total: vec![0; BINS],
            max: 0,
        }
    }

    fn merge(mut self, other: Histogram) -> Histogram {
        for i in 0..BINS {
            self.r[i] += other.r[i];
            self.g[i] += other.g[i];
            self.b[i] += other.b[i];
            self.total[i] += other.total[i];
        }
        self
    }
}

/// Computes channel histograms over a tightly packed RGBA buffer.
pub fn compute(rgba: &[u8]) -> Histogram {
    debug_assert!(rgba.len() % 4 == 0);

    // Chunk size is a multiple of 4 so no pixel straddles two workers.
    let mut histogram = rgba
        .par_chunks(4 * 16384)
        .map(|chunk| {
            let mut h = Histogram::empty();
            for px in chunk.chunks_exact(4) {
                h.r[px[0] as usize] += 1;
                h.g[px[1] as usize] += 1;
                h.b[px[2] as usize] += 1;
                h.total[px[0] as usize] += 1;
                h.total[px[1] as usize] += 1;
                h.total[px[2] as usize] += 1;
            }
            h
        })
        .reduce(Histogram::empty, Histogram::merge);

    histogram.max = histogram.total.iter().copied().max().unwrap_or(0);
    histogram
}
