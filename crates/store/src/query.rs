//! Safe construction of catalog queries.
//!
//! Untrusted sort and search parameters never reach SQL text: sort keys map
//! through a fixed allow-list onto qualified columns, the direction
//! normalizes to `ASC`/`DESC`, and the search term travels as a bound
//! parameter with LIKE wildcards escaped.

/// Columns the catalog can be sorted by.
///
/// `parse` is total: an unrecognized name falls back to the default key and
/// the raw input is discarded.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    ItemId,
    Name,
    CategoryName,
    Quantity,
    MinQuantity,
    Cost,
    Price,
    Location,
    Vendor,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "item_id" => SortKey::ItemId,
            "name" => SortKey::Name,
            "category_name" => SortKey::CategoryName,
            "quantity" => SortKey::Quantity,
            "min_quantity" => SortKey::MinQuantity,
            "cost" => SortKey::Cost,
            "price" => SortKey::Price,
            "location" => SortKey::Location,
            "vendor" => SortKey::Vendor,
            _ => SortKey::default(),
        }
    }

    /// Qualified column for ORDER BY. The only sort text that ever reaches
    /// SQL comes out of this fixed table.
    pub fn column(self) -> &'static str {
        match self {
            SortKey::ItemId => "items.item_id",
            SortKey::Name => "items.name",
            SortKey::CategoryName => "categories.category_name",
            SortKey::Quantity => "items.quantity",
            SortKey::MinQuantity => "items.min_quantity",
            SortKey::Cost => "items.cost",
            SortKey::Price => "items.price",
            SortKey::Location => "items.location",
            SortKey::Vendor => "items.vendor",
        }
    }
}

/// Sort direction; anything that is not `desc` (case-insensitive) is `Asc`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// A normalized catalog query: sort key, direction, optional search term.
///
/// `search` holds the trimmed raw term; pattern wrapping and wildcard
/// escaping happen at render time so non-SQL backends can match the term
/// literally.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemQuery {
    pub sort: SortKey,
    pub dir: SortDir,
    pub search: Option<String>,
}

/// Shared SELECT for item reads; every read resolves the category name
/// through the same join.
pub(crate) const SELECT_ITEMS: &str = "SELECT items.item_id, items.name, items.category_id, categories.category_name, items.quantity, items.min_quantity, items.cost, items.price, items.location, items.vendor FROM items JOIN categories ON categories.category_id = items.category_id";

impl ItemQuery {
    /// Build a query from untrusted request parameters.
    pub fn from_params(sort: Option<&str>, order: Option<&str>, search: Option<&str>) -> Self {
        Self {
            sort: sort.map(SortKey::parse).unwrap_or_default(),
            dir: order.map(SortDir::parse).unwrap_or_default(),
            search: search
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
        }
    }

    /// Render to parameterized SQL.
    ///
    /// The search pattern is bound, never inlined, and `$1` is reused across
    /// the searched columns. Equal queries render identical SQL.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut sql = String::from(SELECT_ITEMS);
        let mut params = Vec::new();

        if let Some(term) = &self.search {
            params.push(format!("%{}%", escape_like(term)));
            sql.push_str(
                " WHERE (items.name ILIKE $1 OR categories.category_name ILIKE $1 OR items.vendor ILIKE $1 OR items.location ILIKE $1)",
            );
        }

        sql.push_str(" ORDER BY ");
        sql.push_str(self.sort.column());
        sql.push(' ');
        sql.push_str(self.dir.as_sql());

        (sql, params)
    }
}

/// Escape LIKE wildcards so a search for `100%` matches the literal text.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_order_by_item_id_ascending() {
        let (sql, params) = ItemQuery::default().to_sql();
        assert_eq!(sql, format!("{SELECT_ITEMS} ORDER BY items.item_id ASC"));
        assert!(params.is_empty());
    }

    #[test]
    fn every_allow_listed_key_maps_to_its_column() {
        let cases = [
            ("item_id", "items.item_id"),
            ("name", "items.name"),
            ("category_name", "categories.category_name"),
            ("quantity", "items.quantity"),
            ("min_quantity", "items.min_quantity"),
            ("cost", "items.cost"),
            ("price", "items.price"),
            ("location", "items.location"),
            ("vendor", "items.vendor"),
        ];
        for (key, column) in cases {
            let (sql, _) = ItemQuery::from_params(Some(key), None, None).to_sql();
            assert!(
                sql.ends_with(&format!("ORDER BY {column} ASC")),
                "{key} rendered {sql}"
            );
        }
    }

    #[test]
    fn unknown_sort_keys_fall_back_to_item_id() {
        for raw in ["bogus", "items.name; DROP TABLE items", "ITEM_ID", ""] {
            let (sql, _) = ItemQuery::from_params(Some(raw), None, None).to_sql();
            assert!(
                sql.ends_with("ORDER BY items.item_id ASC"),
                "{raw:?} rendered {sql}"
            );
        }
    }

    #[test]
    fn direction_normalizes_case_insensitively() {
        for raw in ["desc", "DESC", "Desc", "dEsC"] {
            assert_eq!(SortDir::parse(raw), SortDir::Desc);
        }
        for raw in ["asc", "ASC", "descending", "up", ""] {
            assert_eq!(SortDir::parse(raw), SortDir::Asc);
        }
    }

    #[test]
    fn search_binds_one_pattern_over_four_columns() {
        let (sql, params) = ItemQuery::from_params(None, None, Some("Logi")).to_sql();
        assert!(sql.contains(
            "WHERE (items.name ILIKE $1 OR categories.category_name ILIKE $1 OR items.vendor ILIKE $1 OR items.location ILIKE $1)"
        ));
        assert_eq!(params, vec!["%Logi%".to_string()]);
    }

    #[test]
    fn search_terms_are_trimmed_and_blank_terms_dropped() {
        let trimmed = ItemQuery::from_params(None, None, Some("  mouse "));
        assert_eq!(trimmed.search.as_deref(), Some("mouse"));
        assert_eq!(ItemQuery::from_params(None, None, Some("   ")).search, None);
    }

    #[test]
    fn like_wildcards_are_escaped_in_the_bound_pattern() {
        let (_, params) = ItemQuery::from_params(None, None, Some("100%_A\\B")).to_sql();
        assert_eq!(params, vec!["%100\\%\\_A\\\\B%".to_string()]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let query = ItemQuery::from_params(Some("price"), Some("desc"), Some("cable"));
        assert_eq!(query.to_sql(), query.to_sql());
    }
}
