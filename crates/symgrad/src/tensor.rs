//! Dense n-dimensional tensor.
//!
//! `Tensor` is the concrete value type flowing through a graph: leaves bind
//! one, forward evaluation produces one per node. Storage is a flat
//! column-major buffer; shape and strides describe how to index it.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::strides::{cartesian_to_linear, compute_strides, element_count};

/// A dense n-dimensional tensor in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<ElT: Scalar = f64> {
    data: Vec<ElT>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<ElT: Scalar> Tensor<ElT> {
    /// Create a zero-initialized tensor.
    ///
    /// # Examples
    ///
    /// ```
    /// use symgrad::Tensor;
    ///
    /// let t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, ElT::zero())
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, ElT::one())
    }

    /// Create a tensor with every element set to `value`.
    pub fn full(shape: &[usize], value: ElT) -> Self {
        Self {
            data: vec![value; element_count(shape)],
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        }
    }

    /// Create a one-element tensor of shape `[1]`.
    pub fn scalar(value: ElT) -> Self {
        Self::full(&[1], value)
    }

    /// Create a tensor from column-major data.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if the data length doesn't match
    /// the shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use symgrad::Tensor;
    ///
    /// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get(&[1, 0]), Some(&2.0));
    /// assert_eq!(t.get(&[0, 1]), Some(&3.0));
    /// ```
    pub fn from_vec(data: Vec<ElT>, shape: &[usize]) -> Result<Self, TensorError> {
        let expected = element_count(shape);
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: compute_strides(shape),
        })
    }

    /// Zero-filled tensor with the same shape as `self`.
    pub fn zeros_like(&self) -> Self {
        Self::zeros(&self.shape)
    }

    /// One-filled tensor with the same shape as `self`.
    pub fn ones_like(&self) -> Self {
        Self::ones(&self.shape)
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Rank (number of dimensions).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this tensor holds exactly one element.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.data.len() == 1
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Underlying column-major data.
    #[inline]
    pub fn data(&self) -> &[ElT] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [ElT] {
        &mut self.data
    }

    /// Consume the tensor and return its buffer.
    pub fn into_data(self) -> Vec<ElT> {
        self.data
    }

    #[inline]
    pub fn get_linear(&self, i: usize) -> Option<&ElT> {
        self.data.get(i)
    }

    /// The single element of a one-element tensor.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if the tensor has more or fewer
    /// than one element.
    pub fn item(&self) -> Result<ElT, TensorError> {
        match self.data.as_slice() {
            [value] => Ok(*value),
            other => Err(TensorError::ShapeMismatch {
                expected: 1,
                actual: other.len(),
            }),
        }
    }

    /// Get element by cartesian indices.
    ///
    /// Returns `None` if indices are out of bounds or of the wrong count.
    pub fn get(&self, indices: &[usize]) -> Option<&ElT> {
        if indices.len() != self.ndim() {
            return None;
        }
        if indices.iter().zip(self.shape.iter()).any(|(&i, &d)| i >= d) {
            return None;
        }
        self.data.get(cartesian_to_linear(indices, &self.strides))
    }

    /// Set element by cartesian indices.
    ///
    /// # Errors
    ///
    /// Returns error if indices are out of bounds or of the wrong count.
    pub fn set(&mut self, indices: &[usize], value: ElT) -> Result<(), TensorError> {
        if indices.len() != self.ndim() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.ndim(),
                actual: indices.len(),
            });
        }
        if let Some((&index, &dim_size)) = indices
            .iter()
            .zip(self.shape.iter())
            .find(|&(&i, &d)| i >= d)
        {
            return Err(TensorError::IndexOutOfBounds { index, dim_size });
        }
        let linear = cartesian_to_linear(indices, &self.strides);
        self.data[linear] = value;
        Ok(())
    }

    pub fn fill(&mut self, value: ElT) {
        self.data.iter_mut().for_each(|x| *x = value);
    }

    /// Copy the data into a tensor of a different shape with the same
    /// element count.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if the element counts differ.
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Self, TensorError> {
        Self::from_vec(self.data.clone(), new_shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t: Tensor = Tensor::zeros(&[2, 3]);
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.len(), 6);
        assert_eq!(t.strides(), &[1, 2]);
        assert!(t.data().iter().all(|x| x.is_exact_zero()));
    }

    #[test]
    fn test_from_vec_column_major() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.get(&[0, 0]), Some(&1.0));
        assert_eq!(t.get(&[1, 0]), Some(&2.0));
        assert_eq!(t.get(&[0, 1]), Some(&3.0));
        assert_eq!(t.get(&[1, 2]), Some(&6.0));
    }

    #[test]
    fn test_from_vec_shape_mismatch() {
        let result = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0], &[2, 3]);
        assert_eq!(
            result,
            Err(TensorError::ShapeMismatch {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn test_get_out_of_bounds() {
        let t: Tensor<f64> = Tensor::zeros(&[2, 3]);
        assert_eq!(t.get(&[2, 0]), None);
        assert_eq!(t.get(&[0, 3]), None);
        assert_eq!(t.get(&[0]), None);
    }

    #[test]
    fn test_set() {
        let mut t: Tensor<f64> = Tensor::zeros(&[2, 3]);
        t.set(&[1, 2], 42.0).unwrap();
        assert_eq!(t.get(&[1, 2]), Some(&42.0));
        assert!(matches!(
            t.set(&[2, 0], 1.0),
            Err(TensorError::IndexOutOfBounds {
                index: 2,
                dim_size: 2
            })
        ));
        assert!(matches!(
            t.set(&[0], 1.0),
            Err(TensorError::WrongNumberOfIndices { .. })
        ));
    }

    #[test]
    fn test_scalar_and_item() {
        let t = Tensor::scalar(3.5);
        assert_eq!(t.shape(), &[1]);
        assert!(t.is_scalar());
        assert_eq!(t.item(), Ok(3.5));

        let v: Tensor<f64> = Tensor::ones(&[2]);
        assert!(v.item().is_err());
    }

    #[test]
    fn test_rank_zero() {
        let t: Tensor<f64> = Tensor::zeros(&[]);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.len(), 1);
        assert!(t.is_scalar());
    }

    #[test]
    fn test_fill_and_like() {
        let mut t: Tensor<f64> = Tensor::zeros(&[2, 2]);
        t.fill(5.0);
        assert_eq!(t.data(), &[5.0; 4]);
        assert_eq!(t.ones_like().data(), &[1.0; 4]);
        assert_eq!(t.zeros_like().shape(), &[2, 2]);
    }

    #[test]
    fn test_reshape() {
        let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        let r = t.reshape(&[3, 2]).unwrap();
        assert_eq!(r.shape(), &[3, 2]);
        assert_eq!(r.data(), t.data());
        assert!(t.reshape(&[4]).is_err());
    }
}
