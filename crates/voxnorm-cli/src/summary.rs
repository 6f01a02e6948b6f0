use console::Style;
use voxnorm_core::normalization::NormalizationScheme;
use voxnorm_core::plan::{ChannelNormalizers, NormalizationPlan};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
        }
    }
}

fn yes_no(s: &Styles, flag: bool) -> String {
    if flag {
        s.value.apply_to("yes").to_string()
    } else {
        s.disabled.apply_to("no").to_string()
    }
}

/// One block per channel name: resolved scheme and its requirements.
pub fn print_scheme_table(rows: &[(String, NormalizationScheme)]) {
    let s = Styles::new();

    println!();
    for (name, scheme) in rows {
        println!("  {}", s.header.apply_to(name));
        println!(
            "    {:<18}{}",
            s.label.apply_to("Scheme"),
            s.method.apply_to(scheme.name())
        );
        println!(
            "    {:<18}{}",
            s.label.apply_to("Needs statistics"),
            yes_no(&s, scheme.requires_intensity_properties())
        );
        println!(
            "    {:<18}{}",
            s.label.apply_to("Zero outside mask"),
            yes_no(&s, scheme.zeroes_outside_mask())
        );
        println!();
    }
}

pub fn print_plan_summary(plan: &NormalizationPlan, normalizers: &ChannelNormalizers) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Normalization Plan"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(18)));
    println!();

    for (i, (channel, normalizer)) in plan.channels.iter().zip(normalizers.iter()).enumerate() {
        println!(
            "  {} {}",
            s.label.apply_to(format!("{i}.")),
            s.header.apply_to(&channel.name)
        );
        println!(
            "    {:<14}{}",
            s.label.apply_to("Scheme"),
            s.method.apply_to(normalizer.scheme())
        );
        println!(
            "    {:<14}{}",
            s.label.apply_to("Use mask"),
            yes_no(&s, normalizer.use_mask_for_norm())
        );
        match normalizer.intensity_properties() {
            Some(props) => println!(
                "    {:<14}{}",
                s.label.apply_to("Statistics"),
                s.value.apply_to(format!("mean {:.3}, std {:.3}", props.mean, props.std))
            ),
            None => println!(
                "    {:<14}{}",
                s.label.apply_to("Statistics"),
                s.disabled.apply_to("none")
            ),
        }
        println!();
    }
}
