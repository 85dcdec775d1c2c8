/// Split results into successes and failures, keeping their relative order
pub fn split_results<T, E, I>(results: I) -> (Vec<T>, Vec<E>)
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut ok = vec![];
    let mut err = vec![];

    for x in results {
        match x {
            Ok(x) => ok.push(x),
            Err(e) => err.push(e),
        }
    }

    (ok, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_in_order() {
        let (ok, err) = split_results(vec![Ok(1), Err("a"), Ok(2), Err("b")]);

        assert_eq!(ok, vec![1, 2]);
        assert_eq!(err, vec!["a", "b"]);
    }
}
