//! Shape and stride helpers.
//!
//! Tensors are stored in column-major (Fortran) order, the layout faer's
//! matrix views expect.

/// Number of elements described by `shape`.
///
/// A rank-0 shape describes a single element.
///
/// ```
/// use symgrad::strides::element_count;
///
/// assert_eq!(element_count(&[2, 3]), 6);
/// assert_eq!(element_count(&[]), 1);
/// assert_eq!(element_count(&[4, 0]), 0);
/// ```
#[inline]
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Whether `shape` holds exactly one element and can broadcast as a scalar.
#[inline]
pub fn is_scalar_shape(shape: &[usize]) -> bool {
    element_count(shape) == 1
}

/// Column-major strides for `shape`: `[1, d0, d0*d1, ...]`.
///
/// ```
/// use symgrad::strides::compute_strides;
///
/// assert_eq!(compute_strides(&[3, 4, 5]), vec![1, 3, 12]);
/// assert_eq!(compute_strides(&[]), Vec::<usize>::new());
/// ```
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    shape
        .iter()
        .scan(1, |stride, &dim| {
            let current = *stride;
            *stride *= dim;
            Some(current)
        })
        .collect()
}

/// Linear offset of cartesian `indices` under `strides`.
#[inline]
pub fn cartesian_to_linear(indices: &[usize], strides: &[usize]) -> usize {
    indices
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Cartesian indices of a column-major linear offset.
pub fn linear_to_cartesian(mut linear: usize, shape: &[usize]) -> Vec<usize> {
    shape
        .iter()
        .map(|&dim| {
            let idx = linear % dim;
            linear /= dim;
            idx
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(&[1]), 1);
        assert_eq!(element_count(&[1, 1, 1]), 1);
        assert_eq!(element_count(&[2, 3, 4]), 24);
    }

    #[test]
    fn test_is_scalar_shape() {
        assert!(is_scalar_shape(&[]));
        assert!(is_scalar_shape(&[1]));
        assert!(is_scalar_shape(&[1, 1]));
        assert!(!is_scalar_shape(&[2]));
        assert!(!is_scalar_shape(&[1, 0]));
    }

    #[test]
    fn test_compute_strides() {
        assert_eq!(compute_strides(&[2, 3]), vec![1, 2]);
        assert_eq!(compute_strides(&[5]), vec![1]);
    }

    #[test]
    fn test_cartesian_linear_agree() {
        let shape = [3, 4, 5];
        let strides = compute_strides(&shape);
        assert_eq!(cartesian_to_linear(&[2, 3, 4], &strides), 2 + 3 * 3 + 4 * 12);
        for linear in 0..element_count(&shape) {
            let cartesian = linear_to_cartesian(linear, &shape);
            assert_eq!(cartesian_to_linear(&cartesian, &strides), linear);
        }
    }
}
