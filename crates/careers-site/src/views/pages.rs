//! Server-side HTML for every page the router serves.

use super::context::{
    current_year, DepartmentContext, IndexContext, JobContext, Navigation, PartnerListContext,
    ResultsContext, ThankYouContext,
};
use super::filters::{
    convert_to_kebab, escape_html, get_nav_path, get_secondary_nav_path, markup, sanitize_html,
};
use crate::careers::{SubmissionMessage, Vacancy};
use crate::partners::{Partner, PartnerCategory};

const TOP_NAV: [(&str, &str); 2] = [("careers", "/careers/all"), ("partners", "/partners/find-a-partner")];

fn layout(title: &str, path: &str, body: &str) -> String {
    let active = get_nav_path(path);
    let nav: String = TOP_NAV
        .iter()
        .map(|(segment, href)| {
            let class = if *segment == active {
                " class=\"is-active\""
            } else {
                ""
            };
            format!("<li{class}><a href=\"{href}\">{}</a></li>", capitalise(segment))
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<header><nav><ul>{nav}</ul></nav></header>\n<main>\n{body}</main>\n\
         <footer><p>&copy; {year} Canonical Ltd.</p></footer>\n</body>\n</html>\n",
        title = escape_html(title),
        year = current_year(),
    )
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn message_html(message: &SubmissionMessage) -> String {
    format!(
        "<div class=\"p-notification--{kind}\"><h5>{title}</h5><p>{text}</p></div>\n",
        kind = message.kind.label(),
        title = escape_html(&message.title),
        text = escape_html(&message.text),
    )
}

fn vacancy_rows(vacancies: &[Vacancy]) -> String {
    let mut html = String::from("<table class=\"vacancies\">\n");
    for vacancy in vacancies {
        html.push_str(&format!(
            "<tr id=\"{anchor}\"><td><a href=\"/careers/{id}\">{title}</a></td><td>{location}</td><td>{employment}</td><td>{department}</td></tr>\n",
            anchor = convert_to_kebab(&vacancy.title),
            id = vacancy.id,
            title = escape_html(&vacancy.title),
            location = escape_html(&vacancy.location),
            employment = escape_html(&vacancy.employment),
            department = escape_html(&vacancy.department),
        ));
    }
    html.push_str("</table>\n");
    html
}

fn navigation_html(navigation: &Navigation, path: &str) -> String {
    let active = get_secondary_nav_path(path);
    let mut html = String::from("<aside><ul class=\"departments\">\n");
    let total: usize = navigation.vacancy_count.values().sum();
    html.push_str(&format!(
        "<li><a href=\"/careers/all\">All departments ({total})</a></li>\n"
    ));
    for department in &navigation.departments {
        let class = if department.slug == active {
            " class=\"is-active\""
        } else {
            ""
        };
        html.push_str(&format!(
            "<li{class}><a href=\"/careers/{slug}\">{name} ({count})</a></li>\n",
            slug = department.slug,
            name = escape_html(&department.name),
            count = navigation.count(&department.slug),
        ));
    }
    html.push_str("</ul></aside>\n");
    html
}

fn partner_cards(partners: &[Partner]) -> String {
    let mut html = String::from("<ul class=\"partners\">\n");
    for partner in partners {
        html.push_str(&format!("<li><h4>{}</h4>", escape_html(&partner.name)));
        if let Some(description) = partner.text("short_description") {
            html.push_str(&sanitize_html(&markup(description)));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>\n");
    html
}

pub fn render_index(context: &IndexContext) -> String {
    let mut body = String::from("<h1>Canonical</h1>\n");
    for (category, partners) in &context.partner_groups {
        body.push_str(&format!(
            "<section id=\"{segment}\"><h2><a href=\"/partners/{segment}\">{label}</a></h2>\n{cards}</section>\n",
            segment = category.segment(),
            label = category.label(),
            cards = partner_cards(partners),
        ));
    }
    layout("Canonical", "/", &body)
}

pub fn render_results(context: &ResultsContext) -> String {
    let mut body = String::from("<h1>Roles matching your skills</h1>\n");
    if !context.core_skills.is_empty() {
        body.push_str(&format!(
            "<p class=\"skills\">{}</p>\n",
            escape_html(&context.core_skills.join(", "))
        ));
    }
    if !context.message.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", escape_html(&context.message)));
    }
    for department in &context.departments {
        let vacancies: Vec<Vacancy> = context
            .vacancies
            .iter()
            .filter(|vacancy| &vacancy.department == department)
            .cloned()
            .collect();
        body.push_str(&format!(
            "<h2>{}</h2>\n{}",
            escape_html(department),
            vacancy_rows(&vacancies)
        ));
    }
    layout("Careers results", "/careers/results", &body)
}

pub fn render_department(context: &DepartmentContext) -> String {
    let path = format!("/careers/{}", context.segment);
    let heading = context
        .department
        .as_ref()
        .map_or("All departments", |department| department.name.as_str());

    let mut body = navigation_html(&context.navigation, &path);
    if let Some(message) = &context.message {
        body.push_str(&message_html(message));
    }
    body.push_str(&format!("<h1>{}</h1>\n", escape_html(heading)));
    if context.vacancies.is_empty() {
        body.push_str("<p>There are no open roles in this department right now.</p>\n");
    } else {
        body.push_str(&vacancy_rows(&context.vacancies));
    }
    body.push_str(&application_form(&path));
    layout(&format!("{heading} careers"), &path, &body)
}

pub fn render_job_detail(context: &JobContext) -> String {
    let path = format!("/careers/{}", context.job_id);
    let mut body = navigation_html(&context.navigation, &path);
    if let Some(message) = &context.message {
        body.push_str(&message_html(message));
    }
    body.push_str(&format!(
        "<h1>{title}</h1>\n<p class=\"meta\">{location} &middot; {department}</p>\n<div class=\"job-content\">{content}</div>\n",
        title = escape_html(&context.job.title),
        location = escape_html(&context.job.location),
        department = escape_html(&context.job.department),
        content = context.job.content,
    ));
    body.push_str(&application_form(&path));
    layout(&context.job.title, &path, &body)
}

fn application_form(action: &str) -> String {
    format!(
        "<form method=\"post\" action=\"{action}\" enctype=\"multipart/form-data\">\n\
         <input name=\"first_name\" required><input name=\"last_name\" required>\n\
         <input name=\"email\" type=\"email\" required><input name=\"phone\"><input name=\"location\">\n\
         <input name=\"resume\" type=\"file\" required><input name=\"cover_letter\" type=\"file\">\n\
         <button type=\"submit\">Apply</button>\n</form>\n",
        action = escape_html(action),
    )
}

pub fn render_thank_you(context: &ThankYouContext) -> String {
    let mut body = String::from("<h1>Thank you</h1>\n");
    for message in &context.messages {
        body.push_str(&message_html(message));
    }
    layout("Thank you", "/careers/thank-you", &body)
}

pub fn render_partner_list(context: &PartnerListContext) -> String {
    let body = format!(
        "<h1>{}</h1>\n{}",
        escape_html(&context.title),
        partner_cards(&context.partners)
    );
    layout(&context.title, &context.path, &body)
}

pub fn partner_list_title(category: Option<PartnerCategory>) -> String {
    match category {
        Some(category) => format!("{} partners", category.label()),
        None => "Find a partner".to_string(),
    }
}

/// Wraps a templated page body found on disk.
pub fn render_static_page(path: &str, body: &str) -> String {
    let title = path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or("Canonical");
    layout(&capitalise(title), path, body)
}

pub fn render_error(status: u16, message: &str) -> String {
    let heading = match status {
        404 => "404: Page not found",
        502 => "502: Bad gateway",
        _ => "Something went wrong",
    };
    let body = format!(
        "<h1>{heading}</h1>\n<p>{}</p>\n",
        escape_html(message)
    );
    layout(heading, "/", &body)
}
