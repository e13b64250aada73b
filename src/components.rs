use super::{
    flash::Flash,
    models::{Property, SaleOrRent, User},
};
use ammonia::{clean, clean_text};
use std::fmt::Write;

const STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; }
    nav { display: flex; gap: 1rem; align-items: center; padding: .75rem 1.5rem; background: #eef2ff; }
    nav .spacer { flex: 1; }
    main { max-width: 60rem; margin: 1.5rem auto; padding: 0 1rem; }
    .flash { padding: .5rem 1rem; margin: 1rem 1.5rem 0; border-radius: .25rem; }
    .flash-success { background: #dcfce7; }
    .flash-info { background: #e0f2fe; }
    .flash-warning { background: #fef9c3; }
    .flash-danger { background: #fee2e2; }
    .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); gap: 1rem; }
    .card { border: 1px solid #e5e7eb; border-radius: .25rem; padding: .75rem; }
    .card img, .detail img { max-width: 100%; }
    form.stacked { display: flex; flex-direction: column; gap: .5rem; max-width: 28rem; }
    form.search { display: flex; flex-wrap: wrap; gap: .5rem; margin-bottom: 1rem; }
"#;

pub trait Component {
    /// Render the component to a HTML string. By convention, the
    /// implementation should sanitize all string properties at render-time
    fn render(&self) -> String;
}

pub struct Page<'a> {
    pub title: &'a str,
    pub user: Option<&'a User>,
    pub flash: Option<&'a Flash>,
    pub children: Box<dyn Component + 'a>,
}

impl Component for Page<'_> {
    fn render(&self) -> String {
        let flash = self
            .flash
            .map(|f| FlashBanner { flash: f }.render())
            .unwrap_or_default();
        format!(
            r#"<!DOCTYPE html>
            <html>
                <head>
                    <meta name="viewport" content="width=device-width, initial-scale=1.0"></meta>
                    <title>{title}</title>
                    <style>{STYLE}</style>
                </head>
                <body>
                    {nav}
                    {flash}
                    <main>{body_html}</main>
                </body>
            </html>
            "#,
            title = clean_text(self.title),
            nav = Nav { user: self.user }.render(),
            body_html = self.children.render()
        )
    }
}

pub struct Nav<'a> {
    pub user: Option<&'a User>,
}
impl Component for Nav<'_> {
    fn render(&self) -> String {
        let right = match self.user {
            Some(user) => format!(
                r#"
                <span>Hi, {name}</span>
                <a href="/add">Add listing</a>
                <a href="/logout">Log out</a>
                "#,
                name = clean_text(&user.name)
            ),
            None => r#"
                <a href="/login">Log in</a>
                <a href="/register">Register</a>
                "#
            .to_string(),
        };
        format!(
            r#"
            <nav>
                <a href="/"><strong>Listings</strong></a>
                <a href="/properties">Browse</a>
                <span class="spacer"></span>
                {right}
            </nav>
            "#
        )
    }
}

pub struct FlashBanner<'a> {
    pub flash: &'a Flash,
}
impl Component for FlashBanner<'_> {
    fn render(&self) -> String {
        format!(
            r#"<div class="flash flash-{level}" role="status">{message}</div>"#,
            level = self.flash.level.as_str(),
            message = clean_text(&self.flash.message)
        )
    }
}

/// Amounts are shown without a trailing `.0`
fn fmt_amount(v: f64) -> String {
    format!("{v}")
}

fn fmt_opt<T: ToString>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

pub struct PropertyCard<'a> {
    pub property: &'a Property,
}
impl Component for PropertyCard<'_> {
    fn render(&self) -> String {
        let p = self.property;
        let image = match &p.image_filename {
            Some(name) => format!(
                r#"<img src="/uploads/{src}" alt="{alt}" />"#,
                src = urlencoding::encode(name),
                alt = clean_text(&p.title)
            ),
            None => "".to_string(),
        };
        let amount = match p.sale_or_rent {
            SaleOrRent::Sale => p.price.map(|v| format!("Price: {}", fmt_amount(v))),
            SaleOrRent::Rent => p.rent.map(|v| format!("Rent: {}", fmt_amount(v))),
        }
        .unwrap_or_default();
        format!(
            r#"
            <div class="card">
                {image}
                <h3><a href="/property/{id}">{title}</a></h3>
                <p>{location}</p>
                <p>{property_type} for {mode}</p>
                <p>{amount}</p>
            </div>
            "#,
            id = p.id,
            title = clean_text(&p.title),
            location = clean_text(&p.location),
            property_type = p.property_type.as_str(),
            mode = p.sale_or_rent.as_str(),
        )
    }
}

pub struct PropertyList<'a> {
    pub properties: &'a [Property],
}
impl Component for PropertyList<'_> {
    fn render(&self) -> String {
        if self.properties.is_empty() {
            return "<p>No listings found.</p>".to_string();
        }
        let cards = self.properties.iter().fold(String::new(), |mut acc, p| {
            acc.push_str(&PropertyCard { property: p }.render());
            acc
        });
        format!(r#"<div class="cards">{cards}</div>"#)
    }
}

pub struct Home<'a> {
    pub latest: &'a [Property],
}
impl Component for Home<'_> {
    fn render(&self) -> String {
        format!(
            r#"
            <h1>Latest listings</h1>
            {list}
            <p><a href="/properties">See all listings</a></p>
            "#,
            list = PropertyList {
                properties: self.latest
            }
            .render()
        )
    }
}

pub struct PropertyDetail<'a> {
    pub property: &'a Property,
    /// Edit and delete controls only render for the owner
    pub is_owner: bool,
}
impl Component for PropertyDetail<'_> {
    fn render(&self) -> String {
        let p = self.property;
        let image = match &p.image_filename {
            Some(name) => format!(
                r#"<img src="/uploads/{src}" alt="{alt}" />"#,
                src = urlencoding::encode(name),
                alt = clean_text(&p.title)
            ),
            None => "".to_string(),
        };
        let description = p
            .description
            .as_deref()
            .map(|d| clean(&markdown::to_html(d)))
            .unwrap_or_default();
        let mut facts = String::new();
        for (label, value) in [
            ("Price", p.price.map(fmt_amount)),
            ("Rent", p.rent.map(fmt_amount)),
            ("Area", p.area.map(fmt_amount)),
            ("Rooms", p.rooms.map(|r| r.to_string())),
        ] {
            if let Some(value) = value {
                let _ = write!(facts, "<li>{label}: {value}</li>");
            }
        }
        let controls = if self.is_owner {
            format!(
                r#"
                <a href="/edit/{id}">Edit</a>
                <form method="post" action="/delete/{id}">
                    <button>Delete</button>
                </form>
                "#,
                id = p.id
            )
        } else {
            "".to_string()
        };
        format!(
            r#"
            <article class="detail">
                <h1>{title}</h1>
                {image}
                <p>{location} &middot; {property_type} for {mode}</p>
                <ul>{facts}</ul>
                <div>{description}</div>
                <p>Contact: {contact}</p>
                <p><a href="{gmap_link}" target="_blank" rel="noopener">View on map</a></p>
                {controls}
            </article>
            "#,
            title = clean_text(&p.title),
            location = clean_text(&p.location),
            property_type = p.property_type.as_str(),
            mode = p.sale_or_rent.as_str(),
            contact = clean_text(&p.contact),
            gmap_link = clean_text(safe_href(&p.gmap_link)),
        )
    }
}

/// Only web links become `href`s; `javascript:` and friends are dropped.
fn safe_href(link: &str) -> &str {
    let lower = link.trim_start().to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        link
    } else {
        "#"
    }
}

fn selected(current: &str, option: &str) -> &'static str {
    if current == option {
        "selected"
    } else {
        ""
    }
}

/// Used for both create (`property: None`) and edit.
pub struct PropertyForm<'a> {
    pub property: Option<&'a Property>,
}
impl Component for PropertyForm<'_> {
    fn render(&self) -> String {
        let p = self.property;
        let (heading, action, submit) = match p {
            Some(p) => ("Edit listing", format!("/edit/{}", p.id), "Save"),
            None => ("Add listing", "/add".to_string(), "Publish"),
        };
        let text = |f: fn(&Property) -> Option<String>| {
            p.and_then(f).map(|v| clean_text(&v)).unwrap_or_default()
        };
        let property_type =
            p.map(|p| p.property_type.as_str()).unwrap_or("house");
        let mode = p.map(|p| p.sale_or_rent.as_str()).unwrap_or("sale");
        format!(
            r#"
            <h1>{heading}</h1>
            <form class="stacked" method="post" action="{action}" enctype="multipart/form-data">
                <label>Title <input name="title" required value="{title}" /></label>
                <label>Description <textarea name="description">{description}</textarea></label>
                <label>Location <input name="location" required value="{location}" /></label>
                <label>Type
                    <select name="property_type">
                        <option value="house" {house}>House</option>
                        <option value="land" {land}>Land</option>
                    </select>
                </label>
                <label>For
                    <select name="sale_or_rent">
                        <option value="sale" {sale}>Sale</option>
                        <option value="rent" {rent_mode}>Rent</option>
                    </select>
                </label>
                <label>Price <input name="price" inputmode="decimal" value="{price}" /></label>
                <label>Rent <input name="rent" inputmode="decimal" value="{rent}" /></label>
                <label>Area <input name="area" inputmode="decimal" value="{area}" /></label>
                <label>Rooms <input name="rooms" inputmode="numeric" value="{rooms}" /></label>
                <label>Contact <input name="contact" required value="{contact}" /></label>
                <label>Google Maps link <input name="gmap_link" value="{gmap_link}" /></label>
                <label>Image <input type="file" name="image" accept="image/*" /></label>
                <button>{submit}</button>
            </form>
            "#,
            title = text(|p| Some(p.title.clone())),
            description = text(|p| p.description.clone()),
            location = text(|p| Some(p.location.clone())),
            house = selected(property_type, "house"),
            land = selected(property_type, "land"),
            sale = selected(mode, "sale"),
            rent_mode = selected(mode, "rent"),
            price = text(|p| p.price.map(fmt_amount)),
            rent = text(|p| p.rent.map(fmt_amount)),
            area = text(|p| p.area.map(fmt_amount)),
            rooms = fmt_opt(p.and_then(|p| p.rooms)),
            contact = text(|p| Some(p.contact.clone())),
            gmap_link = text(|p| Some(p.gmap_link.clone())),
        )
    }
}

pub struct RegisterForm;
impl Component for RegisterForm {
    fn render(&self) -> String {
        r#"
        <h1>Register</h1>
        <form class="stacked" method="post" action="/register">
            <label>Name <input name="name" required /></label>
            <label>Email <input name="email" type="email" required /></label>
            <label>Password <input name="password" type="password" required /></label>
            <label>I am a
                <select name="role">
                    <option value="owner">Owner</option>
                    <option value="customer">Customer</option>
                </select>
            </label>
            <button>Register</button>
        </form>
        "#
        .to_string()
    }
}

pub struct LoginForm;
impl Component for LoginForm {
    fn render(&self) -> String {
        r#"
        <h1>Log in</h1>
        <form class="stacked" method="post" action="/login">
            <label>Email <input name="email" type="email" required /></label>
            <label>Password <input name="password" type="password" required /></label>
            <button>Log in</button>
        </form>
        "#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;

    fn property() -> Property {
        Property {
            id: 7,
            title: "<script>alert(1)</script>".into(),
            description: Some("**Big** garden".into()),
            location: "Lagos".into(),
            property_type: PropertyType::House,
            sale_or_rent: SaleOrRent::Rent,
            price: None,
            rent: Some(500.0),
            area: None,
            rooms: Some(2),
            contact: "555".into(),
            image_filename: Some("house_1.jpg".into()),
            gmap_link: "https://www.google.com/maps/search/?api=1&query=Lagos"
                .into(),
            owner_id: 1,
        }
    }

    #[test]
    fn test_user_text_is_escaped() {
        let p = property();
        let html = PropertyCard { property: &p }.render();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Rent: 500"));
        assert!(html.contains(r#"src="/uploads/house_1.jpg""#));
    }

    #[test]
    fn test_detail_controls_only_for_owner() {
        let p = property();
        let owner_view = PropertyDetail {
            property: &p,
            is_owner: true,
        }
        .render();
        let other_view = PropertyDetail {
            property: &p,
            is_owner: false,
        }
        .render();
        assert!(owner_view.contains("/delete/7"));
        assert!(!other_view.contains("/delete/7"));
        assert!(other_view.contains("<strong>Big</strong>"));
        assert!(other_view.contains("Rooms: 2"));
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let p = property();
        let html = PropertyForm { property: Some(&p) }.render();
        assert!(html.contains(r#"action="/edit/7""#));
        assert!(html.contains(r#"value="500""#));
        assert!(html.contains(r#"<option value="rent" selected>"#));
    }

    #[test]
    fn test_map_link_must_be_http() {
        let mut p = property();
        p.gmap_link = "javascript:alert(1)".into();
        let html = PropertyDetail {
            property: &p,
            is_owner: false,
        }
        .render();
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"href="#""##));
    }
}
