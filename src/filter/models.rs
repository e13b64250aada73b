use crate::models::{PropertyType, SaleOrRent};
use serde::Deserialize;
use std::str::FromStr;

/// The raw `/properties` query string. Everything arrives as text so that
/// the search form can echo back exactly what was typed.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchParams {
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub mode: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rent: Option<String>,
    pub max_rent: Option<String>,
    pub min_area: Option<String>,
    pub max_area: Option<String>,
    pub rooms: Option<String>,
}

/// Inclusive bounds on one numeric column. A row whose column is null never
/// satisfies a bound that is present.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// An exact-match filter on an enum column. A supplied value that names no
/// variant still filters, and matches no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exact<T> {
    Is(T),
    Unknown,
}

/// Every present field narrows the result; absent fields don't constrain it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ListingFilter {
    /// Case-insensitive substring
    pub location: Option<String>,
    pub property_type: Option<Exact<PropertyType>>,
    pub sale_or_rent: Option<Exact<SaleOrRent>>,
    pub price: Bounds,
    pub rent: Bounds,
    pub area: Bounds,
    pub rooms: Option<i64>,
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Unparseable numbers are the same as no input.
fn parsed<T: FromStr>(v: &Option<String>) -> Option<T> {
    non_blank(v).and_then(|s| s.parse().ok())
}

fn exact<T: FromStr>(v: &Option<String>) -> Option<Exact<T>> {
    non_blank(v).map(|s| s.parse().map_or(Exact::Unknown, Exact::Is))
}

fn number(v: &Option<String>) -> Option<f64> {
    parsed::<f64>(v).filter(|n| n.is_finite())
}

impl From<&SearchParams> for ListingFilter {
    fn from(p: &SearchParams) -> Self {
        Self {
            location: non_blank(&p.location).map(str::to_string),
            property_type: exact(&p.property_type),
            sale_or_rent: exact(&p.mode),
            price: Bounds {
                min: number(&p.min_price),
                max: number(&p.max_price),
            },
            rent: Bounds {
                min: number(&p.min_rent),
                max: number(&p.max_rent),
            },
            area: Bounds {
                min: number(&p.min_area),
                max: number(&p.max_area),
            },
            rooms: parsed(&p.rooms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn test_empty_params_mean_no_filter() {
        let params = SearchParams {
            location: s("   "),
            property_type: s(""),
            mode: s(""),
            min_price: s(""),
            ..Default::default()
        };
        assert_eq!(ListingFilter::from(&params), ListingFilter::default());
    }

    #[test]
    fn test_values_are_parsed() {
        let params = SearchParams {
            location: s(" Lagos "),
            property_type: s("house"),
            mode: s("rent"),
            min_rent: s("400"),
            max_rent: s("600.5"),
            rooms: s("2"),
            ..Default::default()
        };
        let filter = ListingFilter::from(&params);
        assert_eq!(filter.location.as_deref(), Some("Lagos"));
        assert_eq!(filter.property_type, Some(Exact::Is(PropertyType::House)));
        assert_eq!(filter.sale_or_rent, Some(Exact::Is(SaleOrRent::Rent)));
        assert_eq!(
            filter.rent,
            Bounds {
                min: Some(400.0),
                max: Some(600.5)
            }
        );
        assert_eq!(filter.rooms, Some(2));
        assert_eq!(filter.price, Bounds::default());
    }

    #[test]
    fn test_unparseable_numbers_are_ignored() {
        let params = SearchParams {
            min_price: s("cheap"),
            max_area: s("NaN"),
            rooms: s("2.5"),
            ..Default::default()
        };
        assert_eq!(ListingFilter::from(&params), ListingFilter::default());
    }

    #[test]
    fn test_unknown_choices_still_filter() {
        let params = SearchParams {
            property_type: s("castle"),
            mode: s("lease"),
            ..Default::default()
        };
        let filter = ListingFilter::from(&params);
        assert_eq!(filter.property_type, Some(Exact::Unknown));
        assert_eq!(filter.sale_or_rent, Some(Exact::Unknown));

        let wrong_case = SearchParams {
            property_type: s("House"),
            ..Default::default()
        };
        assert_eq!(
            ListingFilter::from(&wrong_case).property_type,
            Some(Exact::Unknown)
        );
    }
}
