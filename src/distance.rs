use crate::labeling::{LabelMap, LabeledComponent};

/// Stand-in for infinity in the squared-distance grid. Large enough to
/// dominate any squared pixel distance, small enough to keep the envelope
/// intersections finite.
const INF: f64 = 1e20;

/// Exact Euclidean distances over one component's bounding box.
///
/// Foreground pixels hold the distance to the nearest background pixel;
/// background pixels hold 0 and are never used downstream.
pub struct DistanceField {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl DistanceField {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance at bounding-box-local (x, y)
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Largest distance in the field; half the component's widest thickness
    pub fn max_value(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, &v| acc.max(v))
    }
}

/// Compute the exact Euclidean distance transform of one component.
///
/// The component's restricted mask (pixels of other labels count as
/// background) is framed by a one-pixel background border before the
/// transform, so a component pixel on the bounding-box edge measures
/// distance 1 to the implicit outside, matching a full-image transform.
///
/// Two-pass Felzenszwalb-Huttenlocher lower-envelope propagation on squared
/// distances: columns first, then rows, then a square root.
pub fn build_distance_field(labels: &LabelMap, component: &LabeledComponent) -> DistanceField {
    let bw = component.bbox.width() as usize;
    let bh = component.bbox.height() as usize;

    // Padded grid: squared distance 0 at background, INF at component pixels
    let pw = bw + 2;
    let ph = bh + 2;
    let mut grid = vec![0.0f64; pw * ph];

    for by in 0..bh {
        for bx in 0..bw {
            let x = component.bbox.x0 + bx as u32;
            let y = component.bbox.y0 + by as u32;
            if labels.label_at(x, y) == component.label {
                grid[(by + 1) * pw + (bx + 1)] = INF;
            }
        }
    }

    let n = pw.max(ph);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    // Column pass
    for x in 0..pw {
        for y in 0..ph {
            f[y] = grid[y * pw + x];
        }
        edt_1d(&f[..ph], &mut d, &mut v, &mut z);
        for y in 0..ph {
            grid[y * pw + x] = d[y];
        }
    }

    // Row pass
    for y in 0..ph {
        f[..pw].copy_from_slice(&grid[y * pw..y * pw + pw]);
        edt_1d(&f[..pw], &mut d, &mut v, &mut z);
        for x in 0..pw {
            grid[y * pw + x] = d[x];
        }
    }

    // Crop the border frame and take the root
    let mut data = vec![0.0f32; bw * bh];
    for by in 0..bh {
        for bx in 0..bw {
            data[by * bw + bx] = grid[(by + 1) * pw + (bx + 1)].sqrt() as f32;
        }
    }

    DistanceField {
        width: bw,
        height: bh,
        data,
    }
}

/// One-dimensional squared-distance transform of the sampled function f,
/// written into d. v and z are parabola-envelope scratch buffers sized
/// f.len() and f.len() + 1.
fn edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    let mut k = 0usize;
    v[0] = 0;
    z[0] = -INF;
    z[1] = INF;

    for q in 1..n {
        let mut s = intersection(f, q, v[k]);
        // z[0] is -INF and |s| stays below it, so k never underflows
        while s <= z[k] {
            k -= 1;
            s = intersection(f, q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = INF;
    }

    k = 0;
    for q in 0..n {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        let dq = q as f64 - p as f64;
        d[q] = dq * dq + f[p];
    }
}

/// Horizontal position where the parabolas rooted at q and p cross
#[inline]
fn intersection(f: &[f64], q: usize, p: usize) -> f64 {
    let qf = q as f64;
    let pf = p as f64;
    ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
}
