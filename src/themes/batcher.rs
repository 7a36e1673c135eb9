// Batcher: contiguous, order-preserving partition of the article list.

use crate::articles::Article;
use crate::error::ConfigError;

/// Split `articles` into consecutive slices of `size` (the last may be
/// shorter). Batch `i` covers `[i*size, min((i+1)*size, n))`.
pub fn batch(articles: &[Article], size: usize) -> Result<Vec<&[Article]>, ConfigError> {
    if size == 0 {
        return Err(ConfigError::InvalidBatchSize(size));
    }
    Ok(articles.chunks(size).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article::new(i.to_string(), format!("summary {i}"), None))
            .collect()
    }

    #[test]
    fn zero_size_is_a_config_error() {
        assert_eq!(
            batch(&articles(3), 0).unwrap_err(),
            ConfigError::InvalidBatchSize(0)
        );
    }

    #[test]
    fn eight_by_five_is_five_plus_three() {
        let input = articles(8);
        let batches = batch(&input, 5).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[1][0].id(), "5");
    }

    #[test]
    fn partition_reconstructs_input_for_many_sizes() {
        for n in 0..12 {
            let input = articles(n);
            for size in 1..=13 {
                let batches = batch(&input, size).unwrap();
                let rebuilt: Vec<Article> = batches.iter().flat_map(|b| b.iter().cloned()).collect();
                assert_eq!(rebuilt, input, "n={n} size={size}");
                assert_eq!(batches.len(), n.div_ceil(size), "n={n} size={size}");
                assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
            }
        }
    }

    #[test]
    fn empty_input_yields_no_batches() {
        assert!(batch(&[], 5).unwrap().is_empty());
    }
}
