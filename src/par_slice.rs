use num_traits::Num;
use rayon::prelude::*;

/// Sets each element to the same value.
/// `chunk_size` is break the work into tasks for multi-threading.
pub fn set_value<NumType: Num + Copy + Send + Sync>(
    a_slice: &mut [NumType],
    value: NumType,
    chunk_size: usize,
) {
    a_slice
        .par_chunks_mut(chunk_size)
        .for_each(|a_chunk: &mut [NumType]| {
            for a in a_chunk {
                *a = value;
            }
        });
}

/// `a *= factor`
pub fn scale_by<NumType: Num + Copy + Send + Sync>(
    a_slice: &mut [NumType],
    factor: NumType,
    chunk_size: usize,
) {
    a_slice
        .par_chunks_mut(chunk_size)
        .for_each(|a_chunk: &mut [NumType]| {
            for a in a_chunk {
                *a = *a * factor;
            }
        });
}

/// `a += factor * b`
pub fn add_scaled<NumType: Num + Copy + Send + Sync>(
    a_slice: &mut [NumType],
    b_slice: &[NumType],
    factor: NumType,
    chunk_size: usize,
) {
    debug_assert_eq!(a_slice.len(), b_slice.len());
    a_slice
        .par_chunks_mut(chunk_size)
        .zip(b_slice.par_chunks(chunk_size))
        .for_each(|(a_chunk, b_chunk)| {
            for (a, b) in a_chunk.iter_mut().zip(b_chunk.iter()) {
                *a = *a + factor * *b;
            }
        });
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn set_values_test() {
        {
            let mut a = vec![0, 1, 2, 3, 4, 5];
            set_value(&mut a, 7, 6);
            for v in a {
                assert_eq!(v, 7);
            }
        }

        {
            let n = 1000;
            let chunk_size = 10;
            let value = n + 1;
            let mut a: Vec<usize> = (0..n).collect();

            set_value(&mut a, value, chunk_size);

            for v in a {
                assert_eq!(v, value);
            }
        }
    }

    #[test]
    fn scale_and_add_test() {
        let n = 1001;
        let mut a: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let b: Vec<f64> = vec![2.0; n];
        scale_by(&mut a, 0.5, 64);
        add_scaled(&mut a, &b, 3.0, 64);
        for (i, v) in a.iter().enumerate() {
            assert_eq!(*v, 0.5 * i as f64 + 6.0);
        }

        scale_by(&mut a, 0.0, 7);
        assert!(a.iter().all(|v| *v == 0.0));
    }
}
