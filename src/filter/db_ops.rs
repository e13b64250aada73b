use super::models::{Bounds, Exact, ListingFilter};
use crate::{db_ops::PROPERTY_COLUMNS, models::Property};
use anyhow::Result;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// `%`, `_` and the escape character itself match literally.
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `column` is always one of our own column names, never user input.
fn push_bounds(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, b: Bounds) {
    if let Some(min) = b.min {
        qb.push(format!(" and {column} >= ")).push_bind(min);
    }
    if let Some(max) = b.max {
        qb.push(format!(" and {column} <= ")).push_bind(max);
    }
}

/// All listings matching every part of `filter`, newest (highest id) first.
pub async fn search(
    db: &SqlitePool,
    filter: &ListingFilter,
) -> Result<Vec<Property>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "select {PROPERTY_COLUMNS} from property where 1 = 1"
    ));
    if let Some(location) = &filter.location {
        // sqlite's `like` is already case-insensitive for ASCII
        qb.push(" and location like ")
            .push_bind(format!("%{}%", escape_like(location)))
            .push(r" escape '\'");
    }
    match filter.property_type {
        Some(Exact::Is(t)) => {
            qb.push(" and property_type = ").push_bind(t.as_str());
        }
        Some(Exact::Unknown) => {
            qb.push(" and 1 = 0");
        }
        None => {}
    }
    match filter.sale_or_rent {
        Some(Exact::Is(m)) => {
            qb.push(" and sale_or_rent = ").push_bind(m.as_str());
        }
        Some(Exact::Unknown) => {
            qb.push(" and 1 = 0");
        }
        None => {}
    }
    push_bounds(&mut qb, "price", filter.price);
    push_bounds(&mut qb, "rent", filter.rent);
    push_bounds(&mut qb, "area", filter.area);
    if let Some(rooms) = filter.rooms {
        qb.push(" and rooms = ").push_bind(rooms);
    }
    qb.push(" order by id desc");

    Ok(qb.build_query_as::<Property>().fetch_all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::models::SearchParams;
    use crate::{
        db_ops::insert_property,
        models::{ListingDraft, PropertyType, SaleOrRent},
        testing,
    };

    async fn seed(db: &SqlitePool, owner_id: i64, draft: ListingDraft) -> Property {
        insert_property(db, owner_id, draft, "https://maps".into(), None)
            .await
            .expect("insert")
    }

    fn ids(props: &[Property]) -> Vec<i64> {
        props.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[tokio::test]
    async fn test_two_bedroom_flat_in_lagos() {
        let (state, _dir) = testing::test_state().await;
        let owner = testing::make_user(&state.db, "owner@x.com").await;
        let flat = seed(
            &state.db,
            owner.id,
            ListingDraft {
                property_type: PropertyType::House,
                sale_or_rent: SaleOrRent::Rent,
                rent: Some(500.0),
                rooms: Some(2),
                ..testing::draft("2BR Flat", "Lagos")
            },
        )
        .await;

        let found = search(
            &state.db,
            &ListingFilter {
                property_type: Some(Exact::Is(PropertyType::House)),
                rent: Bounds {
                    min: Some(400.0),
                    max: Some(600.0),
                },
                ..Default::default()
            },
        )
        .await
        .expect("search");
        assert_eq!(found, vec![flat]);

        let land = search(
            &state.db,
            &ListingFilter {
                property_type: Some(Exact::Is(PropertyType::Land)),
                ..Default::default()
            },
        )
        .await
        .expect("search");
        assert!(land.is_empty());
    }

    #[tokio::test]
    async fn test_no_filters_returns_everything_newest_first() {
        let (state, _dir) = testing::test_state().await;
        let owner = testing::make_user(&state.db, "o@x.com").await;
        let a = seed(&state.db, owner.id, testing::draft("A", "Lagos")).await;
        let b = seed(&state.db, owner.id, testing::draft("B", "Abuja")).await;
        let c = seed(&state.db, owner.id, testing::draft("C", "Kano")).await;

        let all = search(&state.db, &ListingFilter::default())
            .await
            .expect("search");
        assert_eq!(ids(&all), vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_filters_are_conjunctive() {
        let (state, _dir) = testing::test_state().await;
        let owner = testing::make_user(&state.db, "o@x.com").await;
        let cheap_lagos = seed(
            &state.db,
            owner.id,
            ListingDraft {
                price: Some(1000.0),
                area: Some(50.0),
                ..testing::draft("Cheap", "Lagos Island")
            },
        )
        .await;
        let pricey_lagos = seed(
            &state.db,
            owner.id,
            ListingDraft {
                price: Some(9000.0),
                area: Some(50.0),
                ..testing::draft("Pricey", "lagos mainland")
            },
        )
        .await;
        let cheap_abuja = seed(
            &state.db,
            owner.id,
            ListingDraft {
                price: Some(1000.0),
                area: Some(50.0),
                ..testing::draft("Cheap", "Abuja")
            },
        )
        .await;

        let filter = ListingFilter {
            location: Some("LAGOS".into()),
            price: Bounds {
                min: None,
                max: Some(1000.0),
            },
            ..Default::default()
        };
        let found = search(&state.db, &filter).await.expect("search");
        assert_eq!(ids(&found), vec![cheap_lagos.id]);

        let by_location = ListingFilter {
            location: Some("lagos".into()),
            ..Default::default()
        };
        let found = search(&state.db, &by_location).await.expect("search");
        assert_eq!(ids(&found), vec![pricey_lagos.id, cheap_lagos.id]);

        let by_area = ListingFilter {
            area: Bounds {
                min: Some(50.0),
                max: Some(50.0),
            },
            ..Default::default()
        };
        let found = search(&state.db, &by_area).await.expect("search");
        assert_eq!(
            ids(&found),
            vec![cheap_abuja.id, pricey_lagos.id, cheap_lagos.id]
        );
    }

    #[tokio::test]
    async fn test_bounds_exclude_rows_with_missing_values() {
        let (state, _dir) = testing::test_state().await;
        let owner = testing::make_user(&state.db, "o@x.com").await;
        let priced = seed(
            &state.db,
            owner.id,
            ListingDraft {
                price: Some(10.0),
                ..testing::draft("Priced", "Lagos")
            },
        )
        .await;
        seed(&state.db, owner.id, testing::draft("Unpriced", "Lagos")).await;

        let filter = ListingFilter {
            price: Bounds {
                min: Some(0.0),
                max: None,
            },
            ..Default::default()
        };
        let found = search(&state.db, &filter).await.expect("search");
        assert_eq!(ids(&found), vec![priced.id]);
    }

    #[tokio::test]
    async fn test_rooms_and_mode_are_exact() {
        let (state, _dir) = testing::test_state().await;
        let owner = testing::make_user(&state.db, "o@x.com").await;
        let two = seed(
            &state.db,
            owner.id,
            ListingDraft {
                property_type: PropertyType::House,
                sale_or_rent: SaleOrRent::Rent,
                rooms: Some(2),
                ..testing::draft("Two", "Lagos")
            },
        )
        .await;
        seed(
            &state.db,
            owner.id,
            ListingDraft {
                property_type: PropertyType::House,
                sale_or_rent: SaleOrRent::Sale,
                rooms: Some(2),
                ..testing::draft("Two for sale", "Lagos")
            },
        )
        .await;
        seed(
            &state.db,
            owner.id,
            ListingDraft {
                property_type: PropertyType::House,
                sale_or_rent: SaleOrRent::Rent,
                rooms: Some(3),
                ..testing::draft("Three", "Lagos")
            },
        )
        .await;

        let filter = ListingFilter {
            sale_or_rent: Some(Exact::Is(SaleOrRent::Rent)),
            rooms: Some(2),
            ..Default::default()
        };
        let found = search(&state.db, &filter).await.expect("search");
        assert_eq!(ids(&found), vec![two.id]);
    }

    #[tokio::test]
    async fn test_unknown_type_or_mode_matches_nothing() {
        let (state, _dir) = testing::test_state().await;
        let owner = testing::make_user(&state.db, "o@x.com").await;
        seed(&state.db, owner.id, testing::draft("Plot", "Lagos")).await;

        for (property_type, mode) in [("castle", ""), ("House", ""), ("", "lease")] {
            let params = SearchParams {
                property_type: Some(property_type.into()),
                mode: Some(mode.into()),
                ..Default::default()
            };
            let found = search(&state.db, &ListingFilter::from(&params))
                .await
                .expect("search");
            assert!(found.is_empty(), "type={property_type:?} mode={mode:?}");
        }

        let land = SearchParams {
            property_type: Some("land".into()),
            mode: Some("sale".into()),
            ..Default::default()
        };
        let found = search(&state.db, &ListingFilter::from(&land))
            .await
            .expect("search");
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let (state, _dir) = testing::test_state().await;
        let owner = testing::make_user(&state.db, "o@x.com").await;
        seed(&state.db, owner.id, testing::draft("A", "Lagos")).await;
        let odd = seed(&state.db, owner.id, testing::draft("B", "Block_5%")).await;

        let filter = ListingFilter {
            location: Some("_".into()),
            ..Default::default()
        };
        let found = search(&state.db, &filter).await.expect("search");
        assert_eq!(ids(&found), vec![odd.id]);
    }
}
