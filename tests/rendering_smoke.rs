use posterkit::catalog::InMemoryCatalog;
use posterkit::rendering::{ElementType, FrameStyle};
use posterkit::{CampaignText, CompositionView, CustomizationSession};

#[test]
fn smoke_render_every_builtin_template() {
    let catalog = InMemoryCatalog::builtin();
    for template in catalog.all() {
        let mut session = CustomizationSession::open(template.clone(), 1.5);
        session.set_frame(FrameStyle::VibrantWave);
        let mut view = CompositionView::new(180, CampaignText::default());
        view.update(&session);
        let pixels = view.render().unwrap();
        assert_eq!(pixels.width(), 180);
        assert_eq!(pixels.height(), view.layout().unwrap().height);
    }
}

#[test]
fn smoke_placeholders_are_laid_out() {
    let template = InMemoryCatalog::builtin().find("jan-sampark").unwrap();
    let session = CustomizationSession::open(template, 1.5);
    let mut view = CompositionView::new(300, CampaignText::default());
    view.update(&session);
    let layout = view.layout().unwrap();

    let name = layout.find(|e| *e == ElementType::Name).unwrap();
    assert_eq!(name.text, "Your Name");
    assert!(layout.find(|e| *e == ElementType::ProfilePlaceholder).is_some());
    assert!(layout.find(|e| *e == ElementType::BannerPlaceholder).is_some());
}
