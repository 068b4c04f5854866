/// Where a location's data lives inside the shared spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTab {
    pub gid: i64,
    pub range: String,
}

/// Matrix rows (0-based) that hold each field for one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    pub base_row: usize,
    pub percent_row: usize,
    pub name_row: usize,
    pub second_name_row: Option<usize>,
    pub revenue_row: Option<usize>,
}

impl RowLayout {
    /// Layout of sheets where every column has a single participant.
    pub fn single() -> Self {
        Self {
            base_row: 0,
            percent_row: 1,
            name_row: 7,
            second_name_row: None,
            revenue_row: Some(8),
        }
    }

    /// Layout of sheets where a column may list two participants.
    pub fn multi() -> Self {
        Self {
            base_row: 0,
            percent_row: 1,
            name_row: 7,
            second_name_row: Some(8),
            revenue_row: Some(9),
        }
    }

    pub fn name_rows(&self) -> Vec<usize> {
        std::iter::once(self.name_row)
            .chain(self.second_name_row)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationConfig {
    pub id: String,
    pub title: String,
    pub sheet: SheetTab,
    pub layout: RowLayout,
    pub multiple_participants: bool,
    /// Commission rate in percent, used to back-compute revenue when the
    /// sheet has no revenue figures.
    pub percent_rate: Option<f64>,
}

impl LocationConfig {
    /// Single-participant location with the default layout and an unset sheet tab.
    #[cfg(test)]
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            sheet: SheetTab {
                gid: 0,
                range: String::new(),
            },
            layout: RowLayout::single(),
            multiple_participants: false,
            percent_rate: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_layout_lists_both_name_rows() {
        assert_eq!(RowLayout::multi().name_rows(), vec![7, 8]);
        assert_eq!(RowLayout::single().name_rows(), vec![7]);
    }

    #[test]
    fn new_location_defaults_to_single_participant_layout() {
        let location = LocationConfig::new("ligovka", "Ligovsky 45");
        assert!(!location.multiple_participants);
        assert_eq!(location.layout, RowLayout::single());
        assert_eq!(location.percent_rate, None);
    }
}
