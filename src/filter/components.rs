use super::models::SearchParams;
use crate::{
    components::{Component, PropertyList},
    models::Property,
};
use ammonia::clean_text;

/// The filter form, echoing back whatever was last submitted.
pub struct SearchForm<'a> {
    pub params: &'a SearchParams,
}
impl Component for SearchForm<'_> {
    fn render(&self) -> String {
        let p = self.params;
        let v = |field: &Option<String>| {
            field.as_deref().map(clean_text).unwrap_or_default()
        };
        let choice = |field: &Option<String>, option: &str| {
            if field.as_deref() == Some(option) {
                "selected"
            } else {
                ""
            }
        };
        format!(
            r#"
            <form class="search" method="get" action="/properties">
                <input name="location" placeholder="Location" value="{location}" />
                <select name="type">
                    <option value="">Any type</option>
                    <option value="house" {house}>House</option>
                    <option value="land" {land}>Land</option>
                </select>
                <select name="mode">
                    <option value="">Sale or rent</option>
                    <option value="sale" {sale}>Sale</option>
                    <option value="rent" {rent}>Rent</option>
                </select>
                <input name="min_price" placeholder="Min price" value="{min_price}" />
                <input name="max_price" placeholder="Max price" value="{max_price}" />
                <input name="min_rent" placeholder="Min rent" value="{min_rent}" />
                <input name="max_rent" placeholder="Max rent" value="{max_rent}" />
                <input name="min_area" placeholder="Min area" value="{min_area}" />
                <input name="max_area" placeholder="Max area" value="{max_area}" />
                <input name="rooms" placeholder="Rooms" value="{rooms}" />
                <button>Search</button>
            </form>
            "#,
            location = v(&p.location),
            house = choice(&p.property_type, "house"),
            land = choice(&p.property_type, "land"),
            sale = choice(&p.mode, "sale"),
            rent = choice(&p.mode, "rent"),
            min_price = v(&p.min_price),
            max_price = v(&p.max_price),
            min_rent = v(&p.min_rent),
            max_rent = v(&p.max_rent),
            min_area = v(&p.min_area),
            max_area = v(&p.max_area),
            rooms = v(&p.rooms),
        )
    }
}

pub struct SearchResults<'a> {
    pub params: &'a SearchParams,
    pub properties: &'a [Property],
}
impl Component for SearchResults<'_> {
    fn render(&self) -> String {
        format!(
            r#"
            <h1>Listings</h1>
            {form}
            <p>{count} found</p>
            {list}
            "#,
            form = SearchForm {
                params: self.params
            }
            .render(),
            count = self.properties.len(),
            list = PropertyList {
                properties: self.properties
            }
            .render()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_echoes_params() {
        let params = SearchParams {
            location: Some("Lagos\"><b>".into()),
            mode: Some("rent".into()),
            rooms: Some("2".into()),
            ..Default::default()
        };
        let html = SearchForm { params: &params }.render();
        assert!(html.contains(r#"<option value="rent" selected>"#));
        assert!(html.contains(r#"<option value="sale" >"#));
        assert!(html.contains(r#"name="rooms" placeholder="Rooms" value="2""#));
        assert!(!html.contains("<b>"));
    }
}
