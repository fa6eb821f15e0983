use crate::{
    controller::{DashboardController, Phase},
    data::{
        course::Course,
        form::{FormField, FormMode, FormState},
        student::{Student, format_date},
    },
    maud_conveniences::{
        form_element, render_table, simple_form_element, stat_card, subtitle, title,
    },
    state::RosterState,
};
use axum::extract::State;
use maud::{Markup, html};

const BUTTON: &str = "bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded";

pub async fn internal_get_dashboard(State(state): State<RosterState>) -> Markup {
    render_dashboard(&*state.controller().await)
}

/// The whole dashboard. Every fragment route answers with this so htmx can swap `#dashboard` wholesale.
pub fn render_dashboard(controller: &DashboardController) -> Markup {
    if matches!(controller.phase(), Phase::Idle | Phase::LoadingCourses) {
        return html! {
            div id="dashboard" hx-get="/internal/dashboard" hx-trigger="load delay:500ms" hx-swap="outerHTML" class="text-center" {
                p class="text-gray-400" {"Loading courses..."}
            }
        };
    }

    let stats = controller.stats();

    html! {
        div id="dashboard" class="container mx-auto max-w-5xl w-full flex flex-col space-y-8" {
            div class="flex flex-row items-center justify-between" {
                (title("Student Dashboard"))
                div class="flex flex-row space-x-4" {
                    @if controller.has_store() {
                        button class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded" hx-post="/internal/storage/clear" hx-target="#dashboard" hx-swap="outerHTML" hx-confirm="Remove every student?" {
                            "Clear Saved Students"
                        }
                    }
                    button class=(BUTTON) hx-get="/internal/students/new_form" hx-target="#dashboard" hx-swap="outerHTML" {
                        "Add Student"
                    }
                }
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4" {
                (stat_card("Total Students", stats.total_students))
                (stat_card("Active Courses", stats.courses_in_use))
                (stat_card("Total Courses", stats.total_courses))
            }

            @if let Some(form) = controller.form() {
                (render_form(form, controller.courses(), controller.is_submitting()))
            }

            (render_students(controller.students()))
        }
    }
}

fn render_form(form: &FormState, courses: &[Course], submitting: bool) -> Markup {
    let (heading, submit_label) = match form.mode {
        FormMode::Create => ("Add New Student", "Add Student"),
        FormMode::Edit(_) => ("Edit Student", "Update Student"),
    };
    let course_error = form.errors.get(FormField::Course);

    html! {
        div class="bg-gray-800 p-8 rounded shadow-md" {
            (subtitle(heading))

            @if let Some(submit_error) = &form.submit_error {
                div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                    (submit_error)
                }
            }

            form hx-put="/internal/students/form" hx-trigger="submit" hx-target="#dashboard" hx-swap="outerHTML" hx-disabled-elt="find button[type='submit']" class="p-4" {
                (simple_form_element("name", "Student Name", "text", &form.values.name, form.errors.get(FormField::Name)))
                (simple_form_element("email", "Email Address", "email", &form.values.email, form.errors.get(FormField::Email)))

                (form_element("course", "Enrolled Course", html! {
                    select id="course" name="course" class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {
                        option value="" {"Select a course"}
                        @for course in courses {
                            @let value = course.id.to_string();
                            option value=(value) title=(course.description) selected[value == form.values.course] {
                                (course.name)
                                @if !course.duration.is_empty() {
                                    " (" (course.duration) ")"
                                }
                            }
                        }
                    }
                }, course_error))

                (simple_form_element("profile_image", "Profile Image URL (Optional)", "url", &form.values.profile_image, None))
                p class="text-sm text-gray-400 -mt-3 mb-4" {"Leave empty for auto-generated avatar"}

                div class="flex items-center space-x-4" {
                    button type="submit" disabled[submitting] class={(BUTTON) " disabled:opacity-50"} {
                        @if submitting {
                            "Saving..."
                        } @else {
                            (submit_label)
                        }
                    }
                    button type="button" hx-post="/internal/students/cancel" hx-target="#dashboard" hx-swap="outerHTML" class="bg-gray-700 hover:bg-gray-600 font-bold py-2 px-4 rounded" {
                        "Cancel"
                    }
                }
            }
        }
    }
}

fn render_students(students: &[Student]) -> Markup {
    if students.is_empty() {
        return html! {
            div class="bg-gray-800 p-8 rounded shadow-md text-center" {
                (subtitle("No Students Yet"))
                p class="text-gray-400 mb-6" {"Add your first student to get started"}
                button class=(BUTTON) hx-get="/internal/students/new_form" hx-target="#dashboard" hx-swap="outerHTML" {
                    "Add First Student"
                }
            }
        };
    }

    html! {
        div {
            (subtitle("All Students"))
            (render_table(
                ["", "Name", "Email", "Course", "Enrolled", ""],
                students.iter().map(render_student_row).collect(),
            ))
        }
    }
}

fn render_student_row(student: &Student) -> [Markup; 6] {
    let fallback = format!(
        "this.onerror=null;this.src='/internal/students/avatar?id={}'",
        student.id
    );

    [
        html! {
            img src=(student.profile_image) alt=(student.name) onerror=(fallback) class="w-12 h-12 rounded-full object-cover" {}
        },
        html! { (student.name) },
        html! {
            a href={"mailto:" (student.email)} class="text-blue-200 underline" {(student.email)}
        },
        html! { (student.course) },
        html! {
            (student.enrolled_date)
            p class="text-xs text-gray-400" {"Updated " (format_date(student.updated_at))}
        },
        html! {
            button class="bg-gray-700 hover:bg-gray-600 font-bold py-1 px-3 rounded" hx-get="/internal/students/edit_form" hx-vals={"{\"id\": " (student.id.0) "}"} hx-target="#dashboard" hx-swap="outerHTML" {
                "Edit"
            }
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::form::FormValues,
        service::{FixedConditions, MockDataService},
        validation::EMAIL_INVALID,
    };

    #[tokio::test]
    async fn loading_view_polls_until_ready() {
        let markup = render_dashboard(&DashboardController::new()).into_string();
        assert!(markup.contains("Loading courses..."));
        assert!(markup.contains("hx-get=\"/internal/dashboard\""));
    }

    #[tokio::test]
    async fn ready_view_shows_stats_and_students() {
        let service = MockDataService::new(FixedConditions::instant());
        let mut controller = DashboardController::new();
        controller.mount(&service).await;

        let empty = render_dashboard(&controller).into_string();
        assert!(empty.contains("No Students Yet"));
        assert!(!empty.contains("Clear Saved Students"));

        controller.open_create_form().unwrap();
        controller
            .set_values(FormValues {
                name: "Ana".into(),
                email: "ana@x.com".into(),
                course: "4".into(),
                profile_image: String::new(),
            })
            .unwrap();
        let id = controller.submit(&service).await.unwrap().unwrap();

        let markup = render_dashboard(&controller).into_string();
        assert!(markup.contains("Ana"));
        assert!(markup.contains("React In Depth"));
        assert!(markup.contains(&format!("/internal/students/avatar?id={id}")));
        assert!(markup.contains("Total Students"));
        assert!(!markup.contains("Add New Student"));
    }

    #[tokio::test]
    async fn form_shows_errors_and_selected_course() {
        let service = MockDataService::new(FixedConditions::instant());
        let mut controller = DashboardController::new();
        controller.mount(&service).await;
        controller.open_create_form().unwrap();
        controller
            .set_values(FormValues {
                name: "Ana".into(),
                email: "no-at-sign.com".into(),
                course: "3".into(),
                profile_image: String::new(),
            })
            .unwrap();
        assert_eq!(controller.submit(&service).await.unwrap(), None);

        let markup = render_dashboard(&controller).into_string();
        assert!(markup.contains("Add New Student"));
        assert!(markup.contains(EMAIL_INVALID));
        assert!(markup.contains(
            r#"<option value="3" title="Advanced JavaScript concepts" selected>JavaScript Pro (8 weeks)</option>"#
        ));
        assert!(markup.contains("value=\"no-at-sign.com\""));
    }
}
