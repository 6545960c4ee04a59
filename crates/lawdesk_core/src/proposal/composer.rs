//! Builds proposal paragraphs from a form.
//!
//! # Responsibility
//! - Synthesize the default letter body clause by clause.
//! - Turn a hand-edited body into paragraphs with `**bold**` runs.
//!
//! # Invariants
//! - Missing values render bracketed placeholders, never empty gaps.
//! - Currency and percent values are followed by their amount in words.

use crate::config::FirmConfig;
use crate::model::contract::{Clause, ClauseKind};
use crate::proposal::form::{ProposalForm, SigningPartner};
use crate::proposal::{Align, Block, Run};
use crate::text::dates::long_date_pt;
use crate::text::masks::to_title_case;
use chrono::NaiveDate;

const VALUE_PLACEHOLDER: &str = "[incluir valor]";
const PERCENT_PLACEHOLDER: &str = "[incluir %]";
const CLIENT_PLACEHOLDER: &str = "[NOME DA EMPRESA CLIENTE]";
const CNPJ_PLACEHOLDER: &str = "[CNPJ da empresa cliente]";
const REFERENCE_PLACEHOLDER: &str = "[incluir referência da proposta]";
const OBJECT_PLACEHOLDER: &str = "[incluir objeto da disputa]";
const PRO_LABORE_TERMS: &str =
    "para engajamento no caso, a ser pago em até 10 (dez) dias do aceite dessa proposta;";
const FINAL_SUCCESS_TERMS: &str =
    "a serem pagos em 10 (dez) dias do trânsito em julgado da decisão favorável ao Cliente.";

const SCOPE_CLAUSES: [&str; 5] = [
    "1.2.\tOs serviços previstos nesta proposta abrangem a defesa dos interesses do Contratante em toda e qualquer discussão relacionada ao tema tratado.",
    "1.3.\tAlém da análise do caso e definição da estratégia jurídica, o escopo dos serviços profissionais compreende a análise completa dos documentos e informações enviadas pelo Cliente, elaboração das peças processuais, acompanhamento processual, realização de sustentações orais, despachos, bem como todos os atos conexos necessários a atender os interesses do Cliente nos referidos processos.",
    "1.4.\tOs serviços aqui propostos compreende a participação em reuniões com o Cliente sempre que necessário para entendimentos, esclarecimentos e discussão de estratégias, sempre objetivando a melhor atuação possível do Escritório em defesa dos interesses do Cliente.",
    "1.5.\tTambém está incluída a assessoria jurídica na interlocução com a contraparte, para fins de autocomposição.",
    "1.6.\tOs serviços aqui propostos não incluem consultoria geral ou outra que não possua correlação com o objeto da proposta.",
];

const FEE_CLOSING_CLAUSES: [&str; 2] = [
    "2.5.\tOs honorários de êxito serão integralmente devidos pelo Cliente em caso de transação ou rescisão imotivada do presente contrato.",
    "2.6.\tNos casos de (a) desistência e/ou renúncia que encerrem as discussões travadas; (b) perda superveniente de seu objeto; (c) destituição dos profissionais do ESCRITÓRIO sem culpa dos mesmos; e/ou (d) cessões e/ou operações envolvendo direitos do Contratante e/ou os interesses do ESCRITÓRIO, as Partes decidem, de boa-fé e na melhor forma de Direito, que todos os valores contemplados nesse Contrato, sem exceção, serão integralmente e automaticamente devidos, mesmo se e independentemente se os eventos de êxito ocorrerem após o desligamento do ESCRITÓRIO e independentemente do teor de quaisquer Decisões Judiciais que sejam proferidas, em reconhecimento, pelo Cliente, de que a estratégia desenhada e executada pelo ESCRITÓRIO afigurou-se determinante à obtenção do sucesso em seu favor. Esses valores serão pagos em até 10 (dez) dias após a ocorrência de quaisquer desses eventos.",
];

const GENERAL_CONDITIONS: [&str; 15] = [
    "3.1.\tNão estão incluídas nos honorários as despesas relacionadas ao caso, tais como aquelas com custas judiciais, extrajudiciais, passagens aéreas e hospedagens, dentre outras próprias da(o) Cliente. As despesas poderão ser adiantadas pelo Escritório e submetidas à reembolso pela(o) Cliente. Caso venhamos a contratar outros profissionais, peritos, vistoriadores, tradutores ou demais prestadores de serviços em nome da(o) Cliente e sob prévia aprovação de V.Sa., tal contratação será feita na qualidade de mandatários da(o) Cliente ficando V.Sas. desde já responsável pelo pagamento dos honorários dos profissionais supramencionados.",
    "3.2.\tO atraso no pagamento dos honorários sujeitará o Cliente ao pagamento de multa de mora de 10% (dez por cento), juros de mora de 1% (um por cento) ao mês e correção monetária pela variação positiva do IPCA. Na hipótese de necessidade de cobrança judicial, serão devidos também honorários à razão de 20% (vinte por cento) do valor atualizado do débito.",
    "3.3.\tOs valores previstos na presente proposta, incluindo eventual limite sobre os honorários de êxito, deverão ser corrigidos monetariamente pela variação positiva do IPCA desde a presente data até sua efetiva liquidação.",
    "3.4.\tOs valores devidos a título de honorários são líquidos de tributos, independentemente de alterações legislativas futuras.",
    "3.5.\tEsta proposta foi formulada com base nas informações fornecidas pelo Cliente (ou por pessoa por ele indicada) e em prazo exíguo, buscando o melhor custo-benefício ao Cliente. Verificando-se, no decorrer do processo, divergência entre tais informações e os documentos constantes dos autos, ou a ampliação do escopo originalmente considerado, os honorários poderão ser revistos para recompor o equilíbrio econômico-financeiro, o que poderá ser feito mediante aditivo contratual ou qualquer outra solicitação formal a ser apresentado pelo Escritório.",
    "3.6.\tA contratação do Escritório para a especialidade ora pactuada não caracteriza, por si só, impedimento para que o Escritório atue em assuntos não relacionados de outro cliente, mesmo quando os interesses do outro cliente possam ser eventualmente adversos ao Cliente, desde que: (i) não haja adversidade direta em processo ou procedimento no qual o Escritório represente o Cliente; (ii) não se utilize, nem se ponha em risco, informação confidencial do Cliente; e (iii) sejam observadas barreiras éticas (Chinese wall) e segregação de equipes, quando cabível.",
    "3.7.\tEsta proposta constitui-se em contrato entre as partes com respeito ao assunto objeto desta, podendo ser modificada ou substituída somente mediante autorização por escrito de ambas as partes envolvidas. Em caso de divergência das cláusulas do presente instrumento em relação a outro contrato enviado pelo Cliente, ainda que posterior, prevalecerão as do presente instrumento.",
    "3.8.\tO aceite em relação a presente contratação poderá se dar de forma expressa ou tácita, sendo que neste último caso se dará a partir do início da prestação de serviços pelos Contratados.",
    "3.9.\tEm qualquer caso, a responsabilidade dos Contratados será limitada aos valores efetivamente recebidos por este. Os honorários de sucumbência serão devidos exclusivamente ao Escritório.",
    "3.10.\tMediante expressa autorização da(o) Cliente, os Contratados poderão indicar outros advogados para atuar na referida demanda, cujos custos da contratação serão de responsabilidade d(ao) Cliente.",
    "3.11.\tEsta proposta obriga os herdeiros e sucessores das Partes para o fiel cumprimento de suas obrigações.",
    "3.12.\tO Escritório contratado adota as medidas adequadas, de acordo com as boas práticas da legislação, para impedir qualquer atividade fraudulenta por si, seus advogados, estagiários, e/ou por quaisquer fornecedores, agentes, contratadas, subcontratadas e/ou os empregados.",
    "3.13.\tAs partes se comprometem a cumprir toda a legislação aplicável sobre segurança da informação, privacidade e proteção de dados, inclusive a Constituição Federal, o Código de Defesa do Consumidor, o Código Civil, o Marco Civil da Internet (Lei Federal n. 12.965/2014), seu decreto regulamentador (Decreto 8.771/2016), a Lei Geral de Proteção de Dados (Lei Federal n. 13.709/2018), e demais normas setoriais ou gerais sobre o tema, se comprometendo a tratar apenas os dados mencionados e/ou nas formas dispostas neste instrumento mediante instruções expressas do controlador de dados (parte que determina as finalidades e os meios de tratamento de dados pessoais); ou com o devido embasamento legal, sem transferi-los a qualquer terceiro, exceto se expressamente autorizado por este ou outro instrumento que as vincule.",
    "3.14.\tAs partes concordam em tratar e manter todas e quaisquer informações (escritas ou verbais) como confidenciais, ficando vedado, por ação ou omissão, a revelação de quaisquer informações, documentos entre outros, obtidos nas tratativas e/ou na execução do Contrato, sem prévio e expresso consentimento da outra parte. Tal regra não abrange as informações que se encontram em domínio público nem impede a menção da(o) Contratante como cliente do Escritório.",
    "3.15.\tAs partes elegem o foro da Comarca da Capital da Cidade do Rio de Janeiro para dirimir todas as controvérsias oriundas do presente instrumento, com renúncia expressa a qualquer outro.",
];

const DIGITAL_SIGNATURE: &str = "O Cliente e o Escritório concordam que esta proposta poderá ser firmada de maneira digital por todos os seus signatários. Para este fim, serão utilizados serviços disponíveis no mercado e amplamente utilizados que possibilitam a segurança de assinatura digital por meio de sistemas de certificação capazes de validar a autoria de assinatura eletrônica, bem como de certificar sua integridade, através de certificado digital emitido no padrão ICP-Brasil, autorizando, inclusive, a sua assinatura digital por meio de plataformas digitais.";

/// Paragraphs for `form`.
///
/// `today` dates the letter when the form carries no date.
pub fn compose(form: &ProposalForm, firm: &FirmConfig, code: &str, today: NaiveDate) -> Vec<Block> {
    match form.custom_body.as_deref() {
        Some(body) if form.has_custom_body() => compose_custom_body(body),
        _ => compose_default_body(form, firm, code, today),
    }
}

/// One justified paragraph per non-empty line.
pub fn compose_custom_body(body: &str) -> Vec<Block> {
    body.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(|line| Block::new(parse_marked_line(line)))
        .collect()
}

/// Splits `**bold**` markers into runs. An unmatched marker is kept as text.
pub fn parse_marked_line(line: &str) -> Vec<Run> {
    let parts: Vec<&str> = line.split("**").collect();
    let unmatched_tail = parts.len() % 2 == 0;
    let mut runs = Vec::with_capacity(parts.len());

    for (index, part) in parts.iter().enumerate() {
        let is_tail = unmatched_tail && index == parts.len() - 1;
        if is_tail {
            runs.push(Run::plain(format!("**{part}")));
        } else if !part.is_empty() {
            if index % 2 == 1 {
                runs.push(Run::bold(*part));
            } else {
                runs.push(Run::plain(*part));
            }
        }
    }
    runs
}

pub fn compose_default_body(
    form: &ProposalForm,
    firm: &FirmConfig,
    code: &str,
    today: NaiveDate,
) -> Vec<Block> {
    let client_name = text_or(form.client_name.as_deref(), CLIENT_PLACEHOLDER);
    let location = text_or(form.location.as_deref(), &firm.default_location);
    let date = form.date.unwrap_or(today);
    let partners = form.signing_partners();
    let mut blocks = Vec::new();

    blocks.push(
        Block::text(format!("{location}, {}", long_date_pt(date)))
            .align(Align::Right)
            .before(200)
            .after(400),
    );
    blocks.push(
        Block::new(vec![Run::bold("A "), Run::bold(client_name.to_uppercase())])
            .align(Align::Left)
            .after(100),
    );
    blocks.push(
        Block::bold_text(text_or(form.cnpj.as_deref(), CNPJ_PLACEHOLDER))
            .align(Align::Left)
            .after(300),
    );
    blocks.push(
        Block::new(vec![
            Run::bold("Ref: "),
            Run::plain(text_or(form.reference.as_deref(), REFERENCE_PLACEHOLDER)),
        ])
        .align(Align::Left)
        .after(50),
    );
    blocks.push(
        Block::new(vec![Run::bold("Cód.: "), Run::plain(code)])
            .align(Align::Left)
            .after(400),
    );
    blocks.push(Block::text("Prezados,").after(400));
    blocks.push(introduction(&firm.name, &partners));

    blocks.push(Block::bold_text("1.\tOBJETO E ESCOPO DO SERVIÇO:"));
    blocks.push(Block::new(vec![
        Run::plain(format!(
            "1.1.\tO objeto da presente proposta é a assessoria jurídica a ser realizada pelos advogados que compõem {} (“Escritório”), com vistas à representação judicial em favor do Cliente ",
            to_title_case(&firm.name)
        )),
        Run::bold(client_name),
        Run::plain(" (“Cliente” ou “Contratante”) no "),
        Run::bold(text_or(form.dispute_object.as_deref(), OBJECT_PLACEHOLDER)),
        Run::plain("."),
    ]));
    push_clauses(&mut blocks, &SCOPE_CLAUSES);

    blocks.push(Block::bold_text("2.\tHONORÁRIOS E FORMA DE PAGAMENTO:"));
    blocks.push(Block::text(
        "2.1.\tConsiderando as particularidades do caso, propomos honorários da seguinte forma:",
    ));
    blocks.extend(fee_blocks(form));
    push_clauses(&mut blocks, &FEE_CLOSING_CLAUSES);

    blocks.push(Block::bold_text("3.\tCONDIÇÕES GERAIS:"));
    blocks.extend(GENERAL_CONDITIONS.iter().map(|clause| Block::text(*clause)));
    blocks.push(Block::text(DIGITAL_SIGNATURE).after(400));

    blocks.push(Block::text("Cordialmente,").align(Align::Center).after(300));
    blocks.extend(signature_blocks(&firm.name, &partners, client_name));
    blocks
}

fn text_or<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(placeholder)
}

/// Plain clauses with the last one closing its section.
fn push_clauses(blocks: &mut Vec<Block>, clauses: &[&str]) {
    for (index, clause) in clauses.iter().enumerate() {
        let after = if index + 1 == clauses.len() { 400 } else { 200 };
        blocks.push(Block::text(*clause).after(after));
    }
}

fn introduction(firm_name: &str, partners: &[SigningPartner]) -> Block {
    let mut runs = vec![
        Run::plain("É com grande honra que "),
        Run::bold(firm_name),
        Run::plain(", neste ato representado, respectivamente, por seus sócios "),
    ];
    for (index, partner) in partners.iter().enumerate() {
        let connector = if index == 0 {
            ""
        } else if index + 1 == partners.len() {
            " e "
        } else {
            ", "
        };
        if !connector.is_empty() {
            runs.push(Run::plain(connector));
        }
        runs.push(Run::bold(partner.name.to_uppercase()));
        runs.push(Run::plain(partner.qualification()));
    }
    runs.push(Run::plain(
        " (“Escritório” ou “Contratado”), vem formular a presente proposta de honorários e prestação de serviços advocatícios, nos seguintes termos.",
    ));
    Block::new(runs).after(300)
}

fn placeholder_for(kind: ClauseKind) -> &'static str {
    match kind {
        ClauseKind::Currency => VALUE_PLACEHOLDER,
        ClauseKind::Percent => PERCENT_PLACEHOLDER,
    }
}

/// Bold amount followed by its words, or the bold placeholder.
fn amount_runs(clause: Option<&Clause>, kind: ClauseKind) -> Vec<Run> {
    match clause.and_then(|clause| clause.formatted().map(|text| (clause, text))) {
        Some((clause, formatted)) => vec![Run::bold(formatted), Run::plain(clause.words_suffix())],
        None => vec![Run::bold(placeholder_for(kind))],
    }
}

fn terms_run(description: Option<&str>, fallback: &str) -> Run {
    Run::plain(format!(", {}", text_or(description, fallback)))
}

fn fee_line(label: String, clause: Option<&Clause>, kind: ClauseKind, terms: Option<Run>) -> Block {
    let mut runs = vec![Run::plain(label)];
    runs.extend(amount_runs(clause, kind));
    runs.extend(terms);
    Block::new(runs)
}

fn fee_blocks(form: &ProposalForm) -> Vec<Block> {
    let fees = &form.fees;
    let mut blocks = Vec::new();

    let pro_labore = fees.pro_labore.as_ref();
    blocks.push(fee_line(
        "2.2.\tHonorários pró-labore de ".to_string(),
        pro_labore,
        ClauseKind::Currency,
        Some(terms_run(
            pro_labore.map(|c| c.description.as_str()),
            PRO_LABORE_TERMS,
        )),
    ));
    for (index, extra) in fees.pro_labore_extras.iter().enumerate() {
        let description = extra.description.trim();
        blocks.push(fee_line(
            format!("2.2.{}.\tHonorários pró-labore adicionais de ", index + 1),
            Some(extra),
            extra.kind,
            (!description.is_empty()).then(|| Run::plain(format!(", {description}"))),
        ));
    }

    for (index, fee) in fees.intermediate_fees.iter().enumerate() {
        blocks.push(fee_line(
            format!("2.3.{}.\tÊxito intermediário: ", index + 1),
            Some(fee),
            fee.kind,
            Some(terms_run(Some(&fee.description), "[incluir texto]")),
        ));
    }
    if !fees.intermediate_fees.is_empty() {
        blocks.push(Block::text("").align(Align::Left).after(0));
    }

    blocks.push(final_success_block(form));
    for (index, extra) in fees.final_success_extras.iter().enumerate() {
        blocks.push(fee_line(
            format!("2.4.{}.\tHonorários finais de êxito adicionais de ", index + 1),
            Some(extra),
            extra.kind,
            Some(terms_run(Some(&extra.description), "[incluir texto]")),
        ));
    }
    blocks
}

/// 2.4 combines the fixed fee and the percentage when both are filled in.
fn final_success_block(form: &ProposalForm) -> Block {
    let fee = form.fees.final_success_fee.as_ref().filter(|c| c.has_value());
    let percent = form
        .fees
        .final_success_percent
        .as_ref()
        .filter(|c| c.has_value());

    let mut runs = vec![Run::plain("2.4.\tHonorários finais de êxito de ")];
    if let Some(fee) = fee {
        runs.extend(amount_runs(Some(fee), ClauseKind::Currency));
    }
    if fee.is_some() && percent.is_some() {
        runs.push(Run::plain(" e "));
    }
    if let Some(percent) = percent {
        runs.extend(amount_runs(Some(percent), ClauseKind::Percent));
    }
    if fee.is_none() && percent.is_none() {
        runs.push(Run::plain("[incluir valor/percentual]"));
    }

    let description = [
        form.fees.final_success_fee.as_ref(),
        form.fees.final_success_percent.as_ref(),
    ]
    .into_iter()
    .flatten()
    .map(|clause| clause.description.trim())
    .find(|description| !description.is_empty());
    runs.push(terms_run(description, FINAL_SUCCESS_TERMS));
    Block::new(runs)
}

fn signature_line(name: &str, min_len: usize) -> String {
    "_".repeat((name.chars().count() + 10).max(min_len))
}

fn signature_blocks(firm_name: &str, partners: &[SigningPartner], client_name: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for partner in partners {
        blocks.push(
            Block::text(signature_line(&partner.name, 30))
                .align(Align::Center)
                .before(400)
                .after(0),
        );
        blocks.push(
            Block::bold_text(partner.name.to_uppercase())
                .align(Align::Center)
                .after(0),
        );
    }
    blocks.push(Block::bold_text(firm_name).align(Align::Center).after(0));
    blocks.push(Block::text("").align(Align::Left).after(600));

    let signer = if client_name == CLIENT_PLACEHOLDER {
        ""
    } else {
        client_name
    };
    blocks.push(
        Block::text(signature_line(signer, 40))
            .align(Align::Center)
            .before(400)
            .after(0),
    );
    let client_label = if signer.is_empty() { "[CLIENTE]" } else { signer };
    blocks.push(Block::bold_text(client_label.to_uppercase()).align(Align::Center));
    blocks.push(
        Block::text("De acordo em:     /     /       ")
            .align(Align::Center)
            .after(0),
    );
    blocks.push(
        Block::text("Testemunha 01: __________________________")
            .align(Align::Left)
            .before(600)
            .after(0),
    );
    blocks.push(
        Block::text("Testemunha 02: __________________________")
            .align(Align::Left)
            .before(300)
            .after(0),
    );
    blocks
}
