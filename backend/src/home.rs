use axum::{http::StatusCode, response::Html};
use chrono::{Datelike, Local};
use const_format::concatcp;
use horrorshow::{html, Raw, helper::doctype, RenderOnce, TemplateBuffer, Template};
use shared_data::{sized_image_url, BASE_STYLE, SITE_NAME};
use tracing::warn;

use crate::{log_and_ret, registration::FormState};

// every image lives here at full size (`s1920`); `hosted` asks for the size we actually show
const IMAGE_HOST: &str = "https://lh3.googleusercontent.com/pw/dream-wedding-deals/s1920";

/// Where the widget bundle (`wasm-bindgen --target web` output) gets served from
pub const PKG_PATH: &str = "/pkg";

const WIDGET_LOADER: &str = concatcp!(
	"import init from '", PKG_PATH, "/frontend.js'; init('", PKG_PATH, "/frontend_bg.wasm');"
);

struct PackageItem {
	icon: &'static str,
	title: &'static str,
	description: &'static str
}

const PACKAGE_ITEMS: [PackageItem; 8] = [
	PackageItem { icon: "🏛", title: "Sảnh tiệc lộng lẫy", description: "Sức chứa 200 khách với phong cách kiến trúc Châu Âu." },
	PackageItem { icon: "🍽", title: "Thực đơn 8 món cao cấp", description: "Tự chọn từ danh sách hơn 50 món Á-Âu tinh hoa." },
	PackageItem { icon: "🥂", title: "Trọn gói nước uống", description: "Phục vụ nước ngọt, nước suối không giới hạn trong 2.5 giờ." },
	PackageItem { icon: "💐", title: "Gói trang trí hoa tươi", description: "Bao gồm cổng hoa, bàn gallery, lối đi và hoa bàn tiệc." },
	PackageItem { icon: "🎤", title: "MC chuyên nghiệp", description: "Dẫn dắt buổi lễ trang trọng và ấm cúng." },
	PackageItem { icon: "🎵", title: "Âm thanh & ánh sáng", description: "Hệ thống hiện đại, tiêu chuẩn sân khấu." },
	PackageItem { icon: "🎂", title: "Bánh cưới 5 tầng", description: "Và tháp ly champagne khai tiệc sang trọng." },
	PackageItem { icon: "🎁", title: "Quà tặng đặc biệt", description: "Một đêm tân hôn tại khách sạn 5 sao liên kết." },
];

struct GalleryTab {
	slug: &'static str,
	name: &'static str,
	images: [&'static str; 4]
}

const GALLERY: [GalleryTab; 4] = [
	GalleryTab { slug: "sanh-tiec", name: "Sảnh Tiệc", images: ["sanh-tiec-1.jpg", "sanh-tiec-2.jpg", "sanh-tiec-3.jpg", "sanh-tiec-4.jpg"] },
	GalleryTab { slug: "trang-tri", name: "Trang Trí", images: ["trang-tri-1.jpg", "trang-tri-2.jpg", "trang-tri-3.jpg", "trang-tri-4.jpg"] },
	GalleryTab { slug: "am-thuc", name: "Ẩm Thực", images: ["am-thuc-1.jpg", "am-thuc-2.jpg", "am-thuc-3.jpg", "am-thuc-4.jpg"] },
	GalleryTab { slug: "khoanh-khac", name: "Khoảnh Khắc Cưới", images: ["khoanh-khac-1.jpg", "khoanh-khac-2.jpg", "khoanh-khac-3.jpg", "khoanh-khac-4.jpg"] },
];

struct Testimonial {
	quote: &'static str,
	name: &'static str,
	image: &'static str
}

const TESTIMONIALS: [Testimonial; 3] = [
	Testimonial {
		quote: "Dịch vụ chuyên nghiệp, sảnh tiệc đẹp hơn cả trong ảnh. Cảm ơn Dream Wedding Deals đã cho chúng tôi một ngày cưới không thể nào quên!",
		name: "Cô dâu Minh Anh & Chú rể Quốc Bảo",
		image: "couple-minh-anh.jpg"
	},
	Testimonial {
		quote: "Mọi thứ đều hoàn hảo, từ đồ ăn, trang trí cho tới đội ngũ nhân viên. Chúng tôi rất hài lòng và chắc chắn sẽ giới thiệu cho bạn bè.",
		name: "Cô dâu Thuỳ Linh & Chú rể Hoàng Long",
		image: "couple-thuy-linh.jpg"
	},
	Testimonial {
		quote: "Gói ưu đãi quá tuyệt vời cho một không gian sang trọng như vậy. Vượt xa sự mong đợi của chúng tôi. Cảm ơn nhà hàng rất nhiều!",
		name: "Cô dâu Phương Vy & Chú rể Tuấn Kiệt",
		image: "couple-phuong-vy.jpg"
	},
];

const PAGE_STYLE: &str = r"
section {
	padding: 80px 16px;
}
section.card {
	background-color: var(--card);
}
.container {
	max-width: 1100px;
	margin: 0 auto;
}
.center {
	text-align: center;
}
.split {
	display: grid;
	grid-template-columns: 1fr 1fr;
	gap: 48px;
	align-items: center;
}
.split img, .rounded {
	border-radius: 10px;
	box-shadow: 0 8px 24px rgba(0, 0, 0, 0.2);
	max-width: 100%;
}
.muted {
	color: var(--muted-foreground);
	line-height: 1.7;
}
header {
	position: absolute;
	top: 0;
	left: 0;
	width: 100%;
	z-index: 30;
	padding: 24px 32px;
	display: flex;
	justify-content: space-between;
	align-items: center;
}
header .headline {
	color: white;
	font-size: 20px;
	font-weight: 700;
}
#hero {
	position: relative;
	height: 100vh;
	display: flex;
	align-items: center;
	justify-content: center;
	text-align: center;
	background-size: cover;
	background-position: center;
}
#hero::before {
	content: '';
	position: absolute;
	inset: 0;
	background-color: rgba(0, 0, 0, 0.5);
}
#hero > div {
	position: relative;
}
#hero * {
	color: white;
}
#hero h1 {
	font-size: 56px;
	margin: 0;
}
#hero h2 {
	font-size: 56px;
	margin: 8px 0 0 0;
	color: var(--primary);
}
#hero .note {
	opacity: 0.8;
	font-size: 14px;
}
#package-grid {
	display: grid;
	grid-template-columns: repeat(4, 1fr);
	gap: 32px;
	margin: 48px 0;
	text-align: left;
}
.package-card {
	background-color: var(--card);
	border-radius: 10px;
	padding: 24px;
	box-shadow: 0 4px 12px rgba(0, 0, 0, 0.1);
}
.package-card .icon {
	font-size: 32px;
}
#gallery-tabs > input {
	display: none;
}
#gallery-tabs > label {
	display: inline-block;
	padding: 10px 20px;
	margin: 24px 4px;
	border-radius: 6px;
	cursor: pointer;
	background-color: var(--background);
}
.gallery-panel {
	display: none;
	grid-template-columns: repeat(4, 1fr);
	gap: 16px;
}
.gallery-panel img {
	width: 100%;
	aspect-ratio: 1;
	object-fit: cover;
	border-radius: 10px;
	transition: transform 0.3s;
}
.gallery-panel img:hover {
	transform: scale(1.05);
}
#testimonial-grid {
	display: grid;
	grid-template-columns: repeat(3, 1fr);
	gap: 32px;
	margin-top: 48px;
}
.testimonial {
	background-color: var(--background);
	border-radius: 10px;
	padding: 32px;
}
.testimonial img {
	width: 80px;
	height: 80px;
	border-radius: 50%;
	border: 2px solid var(--primary);
}
.testimonial .quote {
	font-style: italic;
	color: var(--muted-foreground);
}
.testimonial .name {
	font-weight: 700;
	color: var(--primary);
}
#form-card {
	max-width: 760px;
	margin: 0 auto;
	padding: 48px;
	background-color: var(--card);
	border-radius: 10px;
	box-shadow: 0 10px 30px rgba(0, 0, 0, 0.2);
}
#registration-form {
	display: grid;
	gap: 8px;
	margin-top: 32px;
}
#registration-form input[type=submit] {
	margin-top: 24px;
	font-size: 18px;
}
.field-error {
	color: var(--accent);
	font-size: 14px;
}
footer {
	background-color: var(--footer);
	padding: 48px 16px;
	text-align: center;
}
footer * {
	color: #d1d5db;
}
footer a:hover {
	color: var(--primary);
}
#socials a {
	margin: 0 12px;
}
@media (max-width: 768px) {
	.split, #package-grid, #testimonial-grid {
		grid-template-columns: 1fr;
	}
	.gallery-panel {
		grid-template-columns: 1fr 1fr;
	}
	#hero h1, #hero h2 {
		font-size: 36px;
	}
	header .button {
		display: none;
	}
}
";

fn hosted(file: &str, width: u32) -> String {
	let src = format!("{IMAGE_HOST}/{file}");
	sized_image_url(&src, width, None).unwrap_or_else(|e| {
		warn!("Couldn't size image {src}: {e}");
		src
	})
}

// a tab shows its panel when its radio is checked; no js needed
fn gallery_style() -> String {
	GALLERY.iter()
		.map(|tab| format!(
			"#tab-{0}:checked ~ #panel-{0} {{ display: grid; }}\n#tab-{0}:checked + label {{ background-color: var(--primary); }}\n",
			tab.slug
		))
		.collect()
}

pub async fn landing_page() -> Result<Html<String>, (StatusCode, String)> {
	render(FormState::Blank).map(Html)
}

pub fn render(form: FormState) -> Result<String, (StatusCode, String)> {
	let page = LandingPage { form, year: Local::now().year() };
	match page.into_string() {
		Ok(html) => Ok(html),
		Err(e) => log_and_ret!(StatusCode::INTERNAL_SERVER_ERROR, "Couldn't render landing page: {e}")
	}
}

struct LandingPage {
	form: FormState,
	year: i32
}

impl RenderOnce for LandingPage {
	fn render_once(self, tmpl: &mut TemplateBuffer) {
		let Self { form, year } = self;

		tmpl << html! {
			: doctype::HTML;
			html(lang = "vi") {
				head {
					meta(charset = "utf-8");
					meta(name = "viewport", content = "width=device-width, initial-scale=1");
					title : format!("{SITE_NAME} | Tiệc cưới 200 khách chỉ 79 triệu");
					meta(name = "description", content = "Trọn gói tiệc cưới 200 khách tại Quận 12 chỉ với 79.000.000 VNĐ.");
					style : Raw(BASE_STYLE);
					style : Raw(PAGE_STYLE);
					style : Raw(gallery_style());
					style : Raw(shared_data::CHAT_STYLE);
				}
				body {
					header {
						span(class = "headline") : SITE_NAME;
						a(href = "#form-dang-ky", class = "button button-primary") : "Đăng Ký Ngay";
					}

					section(id = "hero", style = format!("background-image: url('{}')", hosted("hero.jpg", 1920))) {
						div {
							h1(class = "headline") : "ĐÁM CƯỚI TRONG MƠ CHO 200 KHÁCH";
							h2(class = "headline") : "CHỈ VỚI 79.000.000 VNĐ";
							p : "Trọn gói ngày chung đôi tại không gian sang trọng bậc nhất Quận 12";
							a(href = "#form-dang-ky", class = "button button-accent") : "ĐĂNG KÝ THAM QUAN NGAY";
							p(class = "note") : "Ưu đãi đặc biệt chỉ dành cho 50 cặp đôi đăng ký đầu tiên trong tháng này!";
						}
					}

					section(id = "introduction", class = "card") {
						div(class = "container split") {
							div {
								h2 : "Viết Nên Câu Chuyện Tình Yêu Của Riêng Bạn";
								p(class = "muted") : "Mỗi câu chuyện tình yêu đều là một bản tình ca độc nhất. Và ngày cưới chính là chương tuyệt vời nhất, nơi bản tình ca ấy được vang lên rực rỡ. Dream Wedding Deals hiểu rằng bạn đang mong chờ một lễ đường hoàn hảo, một không gian xứng tầm để ghi dấu khoảnh khắc trọng đại. Hãy để chúng tôi cùng bạn viết nên chương đẹp nhất của cuộc đời.";
							}
							img(src = hosted("couple-hands.jpg", 600), alt = "Cặp đôi nắm tay", width = "600", height = "400");
						}
					}

					section(id = "package", class = "center") {
						div(class = "container") {
							h2 : "Tất Cả Những Gì Bạn Cần Cho Một Đám Cưới Hoàn Hảo";
							p(class = "muted") : "Gói Tiệc Cưới 200 Khách Bao Gồm:";
							div(id = "package-grid") {
								@ for item in PACKAGE_ITEMS.iter() {
									div(class = "package-card") {
										span(class = "icon") : item.icon;
										h3 : item.title;
										p(class = "muted") : item.description;
									}
								}
							}
							a(href = "#form-dang-ky", class = "button button-outline") : "XEM THỰC ĐƠN CHI TIẾT";
						}
					}

					section(id = "gallery", class = "card center") {
						div(class = "container") {
							h2 : "Chìm Đắm Trong Không Gian Sang Trọng";
							div(id = "gallery-tabs") {
								@ for (idx, tab) in GALLERY.iter().enumerate() {
									@ if idx == 0 {
										input(type = "radio", name = "gallery-tab", id = format!("tab-{}", tab.slug), checked = "checked");
									} else {
										input(type = "radio", name = "gallery-tab", id = format!("tab-{}", tab.slug));
									}
									label(for = format!("tab-{}", tab.slug)) : tab.name;
								}
								@ for tab in GALLERY.iter() {
									div(class = "gallery-panel", id = format!("panel-{}", tab.slug)) {
										@ for (idx, file) in tab.images.iter().enumerate() {
											img(src = hosted(file, 600), alt = format!("{} {}", tab.name, idx + 1), loading = "lazy");
										}
									}
								}
							}
						}
					}

					section(id = "tasting") {
						div(class = "container split") {
							img(src = hosted("tasting.jpg", 600), alt = "Món ăn đặc sắc", width = "600", height = "400");
							div {
								h2 : "Đừng Chỉ Nhìn, Hãy Đến Và Cảm Nhận";
								p(class = "muted") : "Trăm nghe không bằng một thấy, trăm thấy không bằng một thử. Dream Wedding Deals trân trọng mời bạn đến tham dự chương trình Ăn Thử Tiệc Miễn Phí để trực tiếp trải nghiệm và cảm nhận hương vị tinh hoa trong từng món ăn sẽ có mặt trong ngày vui của bạn.";
								a(href = "#form-dang-ky", class = "button button-accent") : "TÌM HIỂU VỀ CHƯƠNG TRÌNH ĂN THỬ";
							}
						}
					}

					section(id = "testimonials", class = "card center") {
						div(class = "container") {
							h2 : "Những Cặp Đôi Đã Tin Chọn Chúng Tôi";
							div(id = "testimonial-grid") {
								@ for t in TESTIMONIALS.iter() {
									div(class = "testimonial") {
										img(src = hosted(t.image, 100), alt = t.name);
										p(class = "quote") : format!("\"{}\"", t.quote);
										p(class = "name") : t.name;
									}
								}
							}
						}
					}

					section(id = "form-dang-ky") {
						div(id = "form-card") {
							div(class = "center") {
								h2 : "Đừng Bỏ Lỡ Ưu Đãi Tốt Nhất!";
								p(class = "muted") : "Để lại thông tin, đội ngũ tư vấn của chúng tôi sẽ liên hệ với bạn trong 30 phút để sắp xếp lịch tham quan.";
							}
							: form;
						}
					}

					footer {
						p(class = "headline") : SITE_NAME;
						p {
							a(href = "https://maps.google.com/?q=Quận+12+TP.HCM") : "📍 123 Đường ABC, Phường XYZ, Quận 12, TP.HCM";
						}
						p {
							a(href = "tel:0987654321") : "📞 0987 654 321";
						}
						p(id = "socials") {
							a(href = "https://facebook.com") : "Facebook";
							a(href = "https://instagram.com") : "Instagram";
							a(href = "https://youtube.com") : "YouTube";
						}
						p : format!("© {year} {SITE_NAME}. All rights reserved.");
					}

					div(id = "chat-widget");
					script(type = "module") : Raw(WIDGET_LOADER);
				}
			}
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn images_are_sized() {
		assert_eq!(
			hosted("hero.jpg", 640),
			"https://lh3.googleusercontent.com/pw/dream-wedding-deals/s640/hero.jpg"
		);
	}

	#[test]
	fn page_has_every_section_and_the_widget() {
		let page = render(FormState::Blank).unwrap();

		for id in ["hero", "introduction", "package", "gallery", "tasting", "testimonials", "form-dang-ky", "chat-widget"] {
			assert!(page.contains(&format!("id=\"{id}\"")), "missing #{id}");
		}

		assert!(page.contains("79.000.000 VNĐ"));
		assert!(page.contains("/pkg/frontend.js"));
		assert!(page.contains(&Local::now().year().to_string()));
	}

	#[test]
	fn gallery_has_a_tab_per_category() {
		let page = render(FormState::Blank).unwrap();
		for tab in &GALLERY {
			assert!(page.contains(&format!("id=\"panel-{}\"", tab.slug)));
		}
		assert_eq!(page.matches("class=\"package-card\"").count(), PACKAGE_ITEMS.len());
		assert_eq!(page.matches("class=\"testimonial\"").count(), TESTIMONIALS.len());
	}
}
