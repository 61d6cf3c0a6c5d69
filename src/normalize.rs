/// Value assigned to every row when a column carries no spread.
pub const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherBetter,
    /// "Allowed" style metrics: conceding less rates higher.
    LowerBetter,
}

/// Min-max rescale a column onto [0, 1].
///
/// Non-finite entries count as absent and stay absent. A column with fewer
/// than two distinct present values gives every row (absent ones included)
/// the neutral 0.5.
pub fn normalize(values: &[Option<f64>], dir: Direction) -> Vec<Option<f64>> {
    let present = values.iter().filter_map(|v| finite(*v));
    let mut bounds: Option<(f64, f64)> = None;
    for v in present {
        bounds = Some(match bounds {
            None => (v, v),
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
        });
    }

    let Some((lo, hi)) = bounds.filter(|(lo, hi)| hi > lo) else {
        return vec![Some(NEUTRAL); values.len()];
    };
    let span = hi - lo;
    values
        .iter()
        .map(|v| finite(*v).map(|v| apply_dir((v - lo) / span, dir)))
        .collect()
}

pub(crate) fn normalize_by<T>(
    rows: &[T],
    field: impl Fn(&T) -> Option<f64>,
    dir: Direction,
) -> Vec<Option<f64>> {
    let column: Vec<Option<f64>> = rows.iter().map(field).collect();
    normalize(&column, dir)
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn apply_dir(v: f64, dir: Direction) -> f64 {
    match dir {
        Direction::HigherBetter => v,
        Direction::LowerBetter => 1.0 - v,
    }
}
