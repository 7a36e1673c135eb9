// Result reshaper: article -> theme becomes theme -> [article ids].

use super::models::{GlobalAssignment, ThemeGroups};

/// Invert the assignment. Iterates in first-assignment order, so groups
/// appear in the order their theme was first used and ids keep input order.
pub fn reshape(assignment: &GlobalAssignment) -> ThemeGroups {
    let mut groups = ThemeGroups::new();
    for (article_id, theme) in assignment.iter() {
        groups.push(theme, article_id);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_in_empty_out() {
        assert!(reshape(&GlobalAssignment::new()).is_empty());
    }

    #[test]
    fn groups_follow_first_use() {
        let assignment: GlobalAssignment = [("0", "Eye Health"), ("1", "Nutrition"), ("2", "Eye Health")]
            .into_iter()
            .collect();
        let groups = reshape(&assignment);
        let names: Vec<&str> = groups.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Eye Health", "Nutrition"]);
        assert_eq!(groups.get("Eye Health").unwrap(), ["0", "2"]);
    }

    #[test]
    fn flatten_round_trips() {
        let assignment: GlobalAssignment = [("a", "X"), ("b", "Y"), ("c", "X"), ("d", "Z"), ("e", "Y")]
            .into_iter()
            .collect();
        let mut flat = reshape(&assignment).flatten();
        let mut original: Vec<(String, String)> = assignment
            .iter()
            .map(|(id, theme)| (id.to_string(), theme.to_string()))
            .collect();
        flat.sort();
        original.sort();
        assert_eq!(flat, original);
    }
}
