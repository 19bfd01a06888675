use crate::validation::{ValidationErrors, INVALID_INTEGER};

/// Parses a comma separated list of ids such as `tags=1,2`.
pub fn parse_id_list(param: &str, value: Option<&str>) -> Result<Option<Vec<i32>>, ValidationErrors> {
    let Some(value) = value else {
        return Ok(None);
    };
    value
        .split(',')
        .map(|id| id.trim().parse::<i32>())
        .collect::<Result<Vec<i32>, _>>()
        .map(Some)
        .map_err(|_| ValidationErrors::single(param, INVALID_INTEGER))
}

/// An integer flag: any non-zero value enables it.
pub fn parse_flag(param: &str, value: Option<&str>) -> Result<bool, ValidationErrors> {
    let Some(value) = value else {
        return Ok(false);
    };
    value
        .trim()
        .parse::<i32>()
        .map(|flag| flag != 0)
        .map_err(|_| ValidationErrors::single(param, INVALID_INTEGER))
}
